// Browser audio graph for one recording: microphone stream -> analyser, plus a
// MediaRecorder collecting compressed chunks of the same stream.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AnalyserNode, AudioContext, AudioContextOptions, AudioContextState, Blob, BlobEvent,
    BlobPropertyBag, MediaRecorder, MediaStream, MediaStreamConstraints, MediaStreamTrack,
    RecordingState,
};

use super::analysis::{ANALYSER, AudioAnalysis, analyze_frame};
use crate::error::{QuestError, QuestResult, describe_js};

pub const BLOB_MIME: &str = "audio/webm;codecs=opus";
/// MediaRecorder time slice in milliseconds.
const CHUNK_MS: i32 = 1000;

fn raw_audio_constraints() -> QuestResult<MediaStreamConstraints> {
    let audio = js_sys::Object::new();
    for key in ["echoCancellation", "noiseSuppression", "autoGainControl"] {
        js_sys::Reflect::set(&audio, &key.into(), &JsValue::FALSE).map_err(QuestError::from_js)?;
    }
    js_sys::Reflect::set(
        &audio,
        &"sampleRate".into(),
        &JsValue::from_f64(ANALYSER.sample_rate as f64),
    )
    .map_err(QuestError::from_js)?;
    let constraints = MediaStreamConstraints::new();
    constraints.set_audio(&audio.into());
    Ok(constraints)
}

async fn request_stream() -> QuestResult<MediaStream> {
    let win = web_sys::window().ok_or(QuestError::NoWindow)?;
    let devices = win
        .navigator()
        .media_devices()
        .map_err(|e| QuestError::Microphone(describe_js(&e)))?;
    let promise = devices
        .get_user_media_with_constraints(&raw_audio_constraints()?)
        .map_err(|e| QuestError::Microphone(describe_js(&e)))?;
    let stream = JsFuture::from(promise)
        .await
        .map_err(|e| QuestError::Microphone(describe_js(&e)))?;
    stream
        .dyn_into::<MediaStream>()
        .map_err(|_| QuestError::Microphone("getUserMedia returned no stream".into()))
}

fn stop_tracks(stream: &MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
            log::debug!("stopping {} track", track.kind());
            track.stop();
        }
    }
}

/// Ask for microphone access once and release it straight away.
pub async fn probe_microphone() -> QuestResult<()> {
    let stream = request_stream().await?;
    stop_tracks(&stream);
    log::info!("microphone access granted");
    Ok(())
}

pub struct Capture {
    stream: MediaStream,
    context: AudioContext,
    analyser: AnalyserNode,
    recorder: MediaRecorder,
    chunks: Rc<RefCell<Vec<Blob>>>,
    freq: Vec<u8>,
    time: Vec<u8>,
    on_data: Closure<dyn FnMut(BlobEvent)>,
    on_error: Closure<dyn FnMut(web_sys::Event)>,
}

impl Capture {
    /// Acquire the microphone and wire stream -> analyser and stream -> recorder.
    pub async fn open() -> QuestResult<Capture> {
        let stream = request_stream().await?;
        match Self::build(stream.clone()).await {
            Ok(c) => Ok(c),
            Err(err) => {
                stop_tracks(&stream);
                Err(err)
            }
        }
    }

    async fn build(stream: MediaStream) -> QuestResult<Capture> {
        let audio_err = |e: JsValue| QuestError::Audio(describe_js(&e));

        let opts = AudioContextOptions::new();
        opts.set_sample_rate(ANALYSER.sample_rate);
        let context = AudioContext::new_with_context_options(&opts).map_err(audio_err)?;
        if context.state() == AudioContextState::Suspended {
            log::debug!("resuming suspended audio context");
            JsFuture::from(context.resume().map_err(audio_err)?)
                .await
                .map_err(audio_err)?;
        }

        let analyser = context.create_analyser().map_err(audio_err)?;
        analyser.set_fft_size(ANALYSER.fft_size);
        analyser.set_smoothing_time_constant(ANALYSER.smoothing);
        analyser.set_min_decibels(ANALYSER.min_decibels);
        analyser.set_max_decibels(ANALYSER.max_decibels);

        let source = context
            .create_media_stream_source(&stream)
            .map_err(audio_err)?;
        source
            .connect_with_audio_node(&analyser)
            .map_err(audio_err)?;

        let recorder = MediaRecorder::new_with_media_stream(&stream).map_err(audio_err)?;
        let chunks: Rc<RefCell<Vec<Blob>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = chunks.clone();
        let on_data = Closure::wrap(Box::new(move |evt: BlobEvent| {
            if let Some(data) = evt.data() {
                if data.size() > 0.0 {
                    log::trace!("audio chunk {} bytes", data.size());
                    sink.borrow_mut().push(data);
                }
            }
        }) as Box<dyn FnMut(BlobEvent)>);
        recorder.set_ondataavailable(Some(on_data.as_ref().unchecked_ref()));
        let on_error = Closure::wrap(Box::new(move |evt: web_sys::Event| {
            log::error!("media recorder error: {}", evt.type_());
        }) as Box<dyn FnMut(web_sys::Event)>);
        recorder.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let bins = analyser.frequency_bin_count() as usize;
        log::info!(
            "audio graph ready: {} Hz, {} bins",
            context.sample_rate(),
            bins
        );
        Ok(Capture {
            stream,
            context,
            analyser,
            recorder,
            chunks,
            freq: vec![0; bins],
            time: vec![0; bins],
            on_data,
            on_error,
        })
    }

    pub fn start(&self) -> QuestResult<()> {
        self.chunks.borrow_mut().clear();
        self.recorder
            .start_with_time_slice(CHUNK_MS)
            .map_err(|e| QuestError::Audio(describe_js(&e)))?;
        log::info!("media recorder started");
        Ok(())
    }

    /// Pull the analyser's current snapshot and derive the frame metrics.
    pub fn sample(&mut self, timestamp: f64) -> AudioAnalysis {
        if self.context.state() == AudioContextState::Suspended {
            let _ = self.context.resume();
        }
        self.analyser.get_byte_frequency_data(&mut self.freq);
        self.analyser.get_byte_time_domain_data(&mut self.time);
        let frame = analyze_frame(&self.freq, &self.time, ANALYSER.sample_rate, timestamp);
        log::trace!(
            "amplitude {:.4} dominant {:.2} Hz",
            frame.amplitude,
            frame.dominant_freq
        );
        frame
    }

    /// Latest time-domain bytes, as read by the last [`Capture::sample`].
    pub fn waveform(&self) -> &[u8] {
        &self.time
    }

    pub fn spectrum(&self) -> &[u8] {
        &self.freq
    }

    /// Tear the graph down. `deliver` receives the packaged audio once the
    /// recorder flushes its final chunk (or `None` when nothing was captured).
    pub fn stop(self, deliver: impl FnOnce(Option<Blob>) + 'static) {
        let Capture {
            stream,
            context,
            recorder,
            chunks,
            on_data,
            on_error,
            ..
        } = self;

        if recorder.state() == RecordingState::Recording {
            let onstop = Closure::once_into_js(move |_evt: web_sys::Event| {
                deliver(package(&chunks.borrow()));
            });
            recorder.set_onstop(Some(onstop.unchecked_ref()));
            if let Err(e) = recorder.stop() {
                log::error!("stopping media recorder: {}", describe_js(&e));
            }
            // the final dataavailable / error events still fire after this
            on_data.forget();
            on_error.forget();
        } else {
            deliver(package(&chunks.borrow()));
        }

        stop_tracks(&stream);
        if context.state() != AudioContextState::Closed {
            match context.close() {
                Ok(p) => wasm_bindgen_futures::spawn_local(async move {
                    match JsFuture::from(p).await {
                        Ok(_) => log::debug!("audio context closed"),
                        Err(e) => log::error!("closing audio context: {}", describe_js(&e)),
                    }
                }),
                Err(e) => log::error!("closing audio context: {}", describe_js(&e)),
            }
        }
    }
}

fn package(chunks: &[Blob]) -> Option<Blob> {
    if chunks.is_empty() {
        return None;
    }
    let parts = js_sys::Array::new();
    for c in chunks {
        parts.push(c);
    }
    let bag = BlobPropertyBag::new();
    bag.set_type(BLOB_MIME);
    match Blob::new_with_blob_sequence_and_options(&parts, &bag) {
        Ok(blob) => {
            log::info!("audio blob {} bytes", blob.size());
            Some(blob)
        }
        Err(e) => {
            log::error!("packaging audio: {}", describe_js(&e));
            None
        }
    }
}

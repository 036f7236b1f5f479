use particles_core::{CaptureStream, Error, FFT_SIZE};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// Live microphone routed through an `AnalyserNode`.
///
/// Owns its own `AudioContext` so releasing the capture also tears down the
/// graph.
pub struct WebMicrophone {
    ctx: web::AudioContext,
    analyser: web::AnalyserNode,
    source: web::MediaStreamAudioSourceNode,
    stream: web::MediaStream,
}

impl CaptureStream for WebMicrophone {
    fn byte_frequency_data(&mut self, out: &mut [u8]) {
        self.analyser.get_byte_frequency_data(out);
    }

    fn is_running(&self) -> bool {
        self.ctx.state() == web::AudioContextState::Running
    }

    fn release(&mut self) {
        stop_tracks(&self.stream);
        _ = self.source.disconnect();
        _ = self.ctx.close();
    }
}

fn stop_tracks(stream: &web::MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<web::MediaStreamTrack>() {
            track.stop();
        }
    }
}

fn classify(err: JsValue) -> Error {
    let name = err
        .dyn_ref::<web::DomException>()
        .map(|e| e.name())
        .unwrap_or_default();
    log::warn!("[audio] getUserMedia failed: {}", name);
    match name.as_str() {
        "NotAllowedError" | "SecurityError" => Error::PermissionDenied,
        _ => Error::DeviceUnavailable,
    }
}

/// Ask for the microphone and wire it into a fresh analyser graph.
pub async fn request_microphone() -> Result<WebMicrophone, Error> {
    let window = web::window().ok_or(Error::DeviceUnavailable)?;
    let devices = window
        .navigator()
        .media_devices()
        .map_err(|_| Error::DeviceUnavailable)?;
    let constraints = web::MediaStreamConstraints::new();
    constraints.set_audio(&JsValue::TRUE);
    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(classify)?;
    let stream: web::MediaStream = JsFuture::from(promise)
        .await
        .map_err(classify)?
        .dyn_into()
        .map_err(|_| Error::DeviceUnavailable)?;

    match build_graph(&stream) {
        Ok((ctx, analyser, source)) => Ok(WebMicrophone {
            ctx,
            analyser,
            source,
            stream,
        }),
        Err(e) => {
            log::error!("[audio] analyser graph failed: {:?}", e);
            stop_tracks(&stream);
            Err(Error::DeviceUnavailable)
        }
    }
}

fn build_graph(
    stream: &web::MediaStream,
) -> Result<(web::AudioContext, web::AnalyserNode, web::MediaStreamAudioSourceNode), JsValue> {
    let ctx = web::AudioContext::new()?;
    let analyser = ctx.create_analyser()?;
    analyser.set_fft_size(FFT_SIZE);
    let source = ctx.create_media_stream_source(stream)?;
    source.connect_with_audio_node(&analyser)?;
    _ = ctx.resume();
    Ok((ctx, analyser, source))
}

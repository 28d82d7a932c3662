//! MJPEG rendering of the simulated camera for `/video_feed`.

use std::{io::Cursor, sync::Arc, time::Duration};

use axum::body::Bytes;
use futures::{Stream, StreamExt};
use image::{codecs::jpeg::JpegEncoder, ImageError, Rgb, RgbImage};
use shared::domain::Mode;
use tokio::sync::Mutex;
use tokio_stream::wrappers::IntervalStream;
use tracing::warn;

use crate::{agent::SimulatedAgent, scene::Frame};

pub const FRAME_BOUNDARY: &str = "frame";
pub const FRAME_WIDTH: u32 = 320;
pub const FRAME_HEIGHT: u32 = 240;
const JPEG_QUALITY: u8 = 70;
const GRID_SPACING: u32 = 20;

pub fn content_type() -> String {
    format!("multipart/x-mixed-replace; boundary={FRAME_BOUNDARY}")
}

/// Draws the scene as a tinted grid with a moving scan line and keypoint marks.
pub fn render_frame(mode: Mode, frame: Option<&Frame>) -> RgbImage {
    let tint = match mode {
        Mode::Explore => Rgb([0, 200, 90]),
        Mode::Return => Rgb([255, 191, 0]),
    };
    let index = frame.map_or(0, |frame| frame.index);
    let keypoints = frame.map_or(0, |frame| frame.keypoints) as u32;
    let scan_row = (index % u64::from(FRAME_HEIGHT)) as u32;

    let mut image = RgbImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, Rgb([8, 12, 16]));
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if x % GRID_SPACING == 0 || y % GRID_SPACING == 0 {
            *pixel = Rgb([24, 40, 48]);
        }
        if y == scan_row {
            *pixel = tint;
        }
    }

    // Scatter one mark per keypoint, seeded by the frame index so marks move between frames.
    let mut seed = index.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
    for _ in 0..keypoints {
        seed = seed
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let x = ((seed >> 33) % u64::from(FRAME_WIDTH)) as u32;
        let y = ((seed >> 17) % u64::from(FRAME_HEIGHT)) as u32;
        image.put_pixel(x, y, tint);
    }
    image
}

pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY).encode_image(image)?;
    Ok(buffer.into_inner())
}

/// Wraps one JPEG in a multipart part.
pub fn multipart_part(jpeg: &[u8]) -> Bytes {
    let header = format!("--{FRAME_BOUNDARY}\r\nContent-Type: image/jpeg\r\n\r\n");
    let mut part = Vec::with_capacity(header.len() + jpeg.len() + 2);
    part.extend_from_slice(header.as_bytes());
    part.extend_from_slice(jpeg);
    part.extend_from_slice(b"\r\n");
    Bytes::from(part)
}

/// Endless multipart stream of the agent's latest frame.
pub fn frame_stream(
    agent: Arc<Mutex<SimulatedAgent>>,
    interval: Duration,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
    let ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    IntervalStream::new(ticker)
        .then(move |_| {
            let agent = Arc::clone(&agent);
            async move {
                let (mode, frame) = {
                    let agent = agent.lock().await;
                    (agent.mode(), agent.last_frame().copied())
                };
                encode_jpeg(&render_frame(mode, frame.as_ref()))
            }
        })
        .filter_map(|encoded| async move {
            match encoded {
                Ok(jpeg) => Some(Ok(multipart_part(&jpeg))),
                Err(error) => {
                    warn!(%error, "video feed: frame encoding failed; skipping frame");
                    None
                }
            }
        })
}

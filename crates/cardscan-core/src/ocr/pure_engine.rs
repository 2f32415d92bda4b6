//! Native text recognizer using `pure-onnx-ocr`.

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use super::{Frame, TextRecognizer};
use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// Recognizer backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct OnnxRecognizer {
    engine: pure_onnx_ocr::engine::OcrEngine,
    config: OcrConfig,
}

impl OnnxRecognizer {
    /// Load the detection and recognition models named in `config`.
    pub fn from_config(config: OcrConfig) -> Result<Self, OcrError> {
        let det_path = config.model_path(&config.detection_model);
        let rec_path = config.model_path(&config.recognition_model);
        let dict_path = config.model_path(&config.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file: {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", config.model_dir.display());

        Ok(Self { engine, config })
    }

    /// Recognize the text lines in an image.
    pub fn recognize_image(&self, image: &DynamicImage) -> Result<Vec<String>, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        if width == 0 || height == 0 {
            return Err(OcrError::InvalidFrame(format!("empty image {}x{}", width, height)));
        }

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let lines: Vec<String> = results
            .iter()
            .map(|r| {
                if self.config.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                }
            })
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect();

        debug!(
            "pure-onnx-ocr: {} lines from {}x{} image in {}ms",
            lines.len(),
            width,
            height,
            start.elapsed().as_millis()
        );

        Ok(lines)
    }
}

impl TextRecognizer for OnnxRecognizer {
    type Payload = DynamicImage;

    fn recognize(&self, frame: &Frame<DynamicImage>) -> Result<Vec<String>, OcrError> {
        self.recognize_image(&frame.payload)
    }

    fn name(&self) -> &'static str {
        "pure-onnx-ocr"
    }
}

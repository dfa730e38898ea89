use anyhow::{Context, Result};
use image::{imageops::FilterType, Rgb, RgbImage};
use ndarray::{Array4, ArrayViewD, IxDyn};
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::Session;
use ort::value::Value;
use std::fs;
use tracing::info;

use crate::adapters::onnx::postprocess::{detections_from_output, Letterbox};
use crate::domain::class_index::ClassIndex;
use crate::domain::detection::Detection;
use crate::domain::model::{InferenceConfig, YoloParams};

pub struct OnnxYoloEngine {
    session: Session,
    class_index: ClassIndex,
    params: YoloParams,
}

impl OnnxYoloEngine {
    pub fn load(config: &InferenceConfig) -> Result<Self> {
        let mut builder = Session::builder()?.with_intra_threads(config.intra_threads)?;

        // CUDA is optional: registered when available, otherwise we stay on CPU.
        let cuda = CUDAExecutionProvider::default().build();
        if let Ok(builder_with_cuda) = builder.clone().with_execution_providers([cuda]) {
            builder = builder_with_cuda;
        }

        let path = &config.model.onnx_path;
        let model_bytes = fs::read(path).with_context(|| format!("failed to read model file {path}"))?;
        let session = builder
            .commit_from_memory(&model_bytes)
            .with_context(|| format!("failed to build ONNX session from {path}"))?;

        let class_index = match &config.labels_path {
            Some(labels) => ClassIndex::from_labels_file(labels)?,
            None => read_class_index(&session)?,
        };
        info!(
            model = %config.model.name,
            classes = class_index.len(),
            input_size = config.params.input_size,
            "model loaded"
        );

        Ok(Self {
            session,
            class_index,
            params: config.params.clone(),
        })
    }

    pub fn class_index(&self) -> &ClassIndex {
        &self.class_index
    }

    pub fn infer(&mut self, rgb: &RgbImage) -> Result<Vec<Detection>> {
        let imgsz = self.params.input_size;
        let (width, height) = rgb.dimensions();

        // Letterbox: keep the aspect ratio, centre on a grey canvas.
        let letterbox = Letterbox::fit(width, height, imgsz);
        let resized = image::imageops::resize(rgb, letterbox.new_width, letterbox.new_height, FilterType::Triangle);
        let mut padded = RgbImage::from_pixel(imgsz, imgsz, Rgb([Letterbox::FILL; 3]));
        image::imageops::overlay(&mut padded, &resized, letterbox.pad_x as i64, letterbox.pad_y as i64);

        let size = imgsz as usize;
        let mut input = Array4::<f32>::zeros((1, 3, size, size));
        for (x, y, pixel) in padded.enumerate_pixels() {
            input[[0, 0, y as usize, x as usize]] = pixel[0] as f32 / 255.0;
            input[[0, 1, y as usize, x as usize]] = pixel[1] as f32 / 255.0;
            input[[0, 2, y as usize, x as usize]] = pixel[2] as f32 / 255.0;
        }

        let input_shape = vec![1, 3, size as i64, size as i64];
        let input_tensor = Value::from_array((input_shape, input.into_raw_vec_and_offset().0))?;

        let outputs = self.session.run(ort::inputs![input_tensor])?;
        let (shape_out, data_out) = outputs[0].try_extract_tensor::<f32>()?;

        let dims: Vec<usize> = shape_out.iter().map(|&x| x as usize).collect();
        let output = ArrayViewD::from_shape(IxDyn(&dims), data_out)?;

        detections_from_output(output, &self.params, &letterbox, width, height, &self.class_index)
    }
}

/// Class names come from the `names` property the exporter stores in the model metadata.
fn read_class_index(session: &Session) -> Result<ClassIndex> {
    let names = session
        .metadata()?
        .custom("names")?
        .context("model metadata has no `names` property, supply a labels file instead")?;
    Ok(ClassIndex::parse_metadata_names(&names)?)
}

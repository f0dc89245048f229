use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_STEPS: u32 = 50;
pub(crate) const DEFAULT_SEED: i64 = 2414;
pub(crate) const DEFAULT_GUIDANCE_SCALE: f64 = 7.5;
pub(crate) const DEFAULT_STRENGTH: f64 = 0.75;

/// The `message` returned by `add-task` when a job is queued.
pub(crate) const ACCEPTED_MESSAGE: &str = "Request accepted successfully";

/// The output shape of generated images.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    #[default]
    Square,
    Landscape,
    Portrait,
}

/// The generation model variant a task is submitted to.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    /// Image from a text prompt.
    #[default]
    Txt2img,
    /// Image from a prompt and a starting image.
    Img2img,
    /// Instruction-driven editing of an existing image.
    Pix2pix,
}

/// The generation parameters sent under the `data` key of `add-task`.
///
/// No client-side validation is performed; out-of-range values are left
/// for the service to reject.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// A text description of the image to generate.
    pub prompt: String,
    /// Things the image should avoid. May be empty.
    #[serde(rename = "negprompt")]
    pub negative_prompt: String,
    /// Number of images to generate.
    pub samples: u32,
    /// Number of diffusion steps.
    pub steps: u32,
    pub aspect_ratio: AspectRatio,
    pub guidance_scale: f64,
    pub seed: i64,
    /// Source image for image-to-image and editing tasks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_image_url: Option<String>,
    /// How far the result may drift from `init_image_url`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
}

impl GenerationRequest {
    /// Creates a text-to-image request with the default parameters:
    /// empty negative prompt, one sample, 50 steps, square, guidance 7.5, seed 2414.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: String::new(),
            samples: 1,
            steps: DEFAULT_STEPS,
            aspect_ratio: AspectRatio::Square,
            guidance_scale: DEFAULT_GUIDANCE_SCALE,
            seed: DEFAULT_SEED,
            init_image_url: None,
            strength: None,
        }
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = negative_prompt.into();
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_guidance_scale(mut self, guidance_scale: f64) -> Self {
        self.guidance_scale = guidance_scale;
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = seed;
        self
    }

    /// Attaches a source image. `strength` defaults to 0.75 when `None`.
    pub fn with_init_image(mut self, url: impl Into<String>, strength: Option<f64>) -> Self {
        self.init_image_url = Some(url.into());
        self.strength = Some(strength.unwrap_or(DEFAULT_STRENGTH));
        self
    }
}

/// (Internal) The `add-task` request envelope.
#[derive(Serialize, Debug)]
pub(crate) struct AddTaskRequest<'a> {
    pub(crate) model: Model,
    pub(crate) data: &'a GenerationRequest,
}

/// (Internal) The body returned by `add-task`.
#[derive(Deserialize, Debug)]
pub(crate) struct AddTaskResponse {
    #[serde(default)]
    pub(crate) message: Option<String>,
    pub(crate) process_id: String,
}

/// Identifies a submitted job. Serializes as the `task-status` request body.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub process_id: String,
}

impl JobHandle {
    pub fn new(process_id: impl Into<String>) -> Self {
        Self {
            process_id: process_id.into(),
        }
    }
}

/// The lifecycle state reported under `response_data.status`.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    InQueue,
    InProgress,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl TaskState {
    /// Only `Completed` ends polling.
    pub fn is_completed(self) -> bool {
        self == TaskState::Completed
    }
}

/// The generated image URLs of a finished task.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TaskResult {
    #[serde(default)]
    pub output: Vec<String>,
}

/// The `response_data` object of a status response.
#[derive(Debug, Deserialize, Clone)]
pub struct TaskStatusData {
    pub status: TaskState,
    #[serde(default)]
    pub process_id: Option<String>,
    #[serde(default)]
    pub result: Option<TaskResult>,
    #[serde(default)]
    pub credit_used: Option<f64>,
    #[serde(default)]
    pub overage: Option<f64>,
}

/// The parsed body of a `task-status` response.
#[derive(Debug, Deserialize, Clone)]
pub struct TaskStatusMessage {
    #[serde(default)]
    pub message: Option<String>,
    pub response_data: TaskStatusData,
}

/// One status check: the parsed message plus the exact body text it came from.
#[derive(Debug, Clone)]
pub struct StatusResponse {
    pub message: TaskStatusMessage,
    pub raw: String,
}

impl StatusResponse {
    /// Parses a raw `task-status` body. Fails if `response_data.status` is missing.
    pub fn from_body(raw: String) -> Result<Self, serde_json::Error> {
        let message = serde_json::from_str(&raw)?;
        Ok(Self { message, raw })
    }

    pub fn status(&self) -> TaskState {
        self.message.response_data.status
    }

    pub fn is_completed(&self) -> bool {
        self.status().is_completed()
    }

    /// Result image URLs, empty until the task completes.
    pub fn output(&self) -> &[String] {
        self.message
            .response_data
            .result
            .as_ref()
            .map(|r| r.output.as_slice())
            .unwrap_or_default()
    }
}

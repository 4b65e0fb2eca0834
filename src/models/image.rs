use std::fmt;
use std::ops::Index;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{OpenAIError, Result};

pub const MAX_PROMPT_LENGTH: usize = 1000;
pub const MAX_IMAGE_COUNT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageSize {
    #[serde(rename = "256x256")]
    Small,
    #[serde(rename = "512x512")]
    Medium,
    #[default]
    #[serde(rename = "1024x1024")]
    Large,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Small => "256x256",
            ImageSize::Medium => "512x512",
            ImageSize::Large => "1024x1024",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageResponseFormat {
    #[default]
    Url,
    B64Json,
}

impl ImageResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageResponseFormat::Url => "url",
            ImageResponseFormat::B64Json => "b64_json",
        }
    }
}

fn validate_prompt(prompt: &str) -> Result<()> {
    if prompt.trim().is_empty() {
        return Err(OpenAIError::argument("prompt must not be empty"));
    }
    if prompt.chars().count() > MAX_PROMPT_LENGTH {
        return Err(OpenAIError::argument(format!(
            "prompt exceeds {} characters",
            MAX_PROMPT_LENGTH
        )));
    }
    Ok(())
}

fn validate_count(n: u32) -> Result<()> {
    if !(1..=MAX_IMAGE_COUNT).contains(&n) {
        return Err(OpenAIError::argument(format!(
            "number of images must be between 1 and {}, got {}",
            MAX_IMAGE_COUNT, n
        )));
    }
    Ok(())
}

/// Optional knobs shared by every image request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageOptions {
    pub n: u32,
    pub size: ImageSize,
    pub response_format: ImageResponseFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            n: 1,
            size: ImageSize::default(),
            response_format: ImageResponseFormat::default(),
            user: None,
        }
    }
}

impl ImageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_count(mut self, n: u32) -> Self {
        self.n = n;
        self
    }

    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_response_format(mut self, response_format: ImageResponseFormat) -> Self {
        self.response_format = response_format;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

/// Request body for `POST /images/generations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageGenerationRequest {
    prompt: String,
    #[serde(flatten)]
    options: ImageOptions,
}

impl ImageGenerationRequest {
    pub fn new(prompt: impl Into<String>, options: ImageOptions) -> Result<Self> {
        let prompt = prompt.into();
        validate_prompt(&prompt)?;
        validate_count(options.n)?;
        Ok(Self { prompt, options })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &ImageOptions {
        &self.options
    }
}

/// Multipart request for `POST /images/edits`. The files are read when the
/// request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEditRequest {
    image: PathBuf,
    mask: Option<PathBuf>,
    prompt: String,
    options: ImageOptions,
}

impl ImageEditRequest {
    pub fn new(
        image: impl Into<PathBuf>,
        mask: Option<PathBuf>,
        prompt: impl Into<String>,
        options: ImageOptions,
    ) -> Result<Self> {
        let prompt = prompt.into();
        validate_prompt(&prompt)?;
        validate_count(options.n)?;
        Ok(Self {
            image: image.into(),
            mask,
            prompt,
            options,
        })
    }

    pub fn image(&self) -> &PathBuf {
        &self.image
    }

    pub fn mask(&self) -> Option<&PathBuf> {
        self.mask.as_ref()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &ImageOptions {
        &self.options
    }
}

/// Multipart request for `POST /images/variations`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageVariationRequest {
    image: PathBuf,
    options: ImageOptions,
}

impl ImageVariationRequest {
    pub fn new(image: impl Into<PathBuf>, options: ImageOptions) -> Result<Self> {
        validate_count(options.n)?;
        Ok(Self {
            image: image.into(),
            options,
        })
    }

    pub fn image(&self) -> &PathBuf {
        &self.image
    }

    pub fn options(&self) -> &ImageOptions {
        &self.options
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesResponse {
    pub created: i64,
    #[serde(default)]
    pub data: Vec<ImageData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub b64_json: Option<String>,
    #[serde(default)]
    pub revised_prompt: Option<String>,
}

/// One generated image. `key` is the URL, or the base64 payload when
/// `b64_json` was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub key: String,
    pub url: Option<String>,
    pub b64_json: Option<String>,
}

/// Ordered, read-only images returned by one call.
#[derive(Debug, Clone, Default)]
pub struct ImageResults {
    created: i64,
    images: Vec<GeneratedImage>,
    skipped: usize,
}

impl ImageResults {
    pub fn created(&self) -> i64 {
        self.created
    }

    /// Response entries left out because they carried neither `url` nor `b64_json`.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeneratedImage> {
        self.images.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.images.iter().map(|image| image.key.as_str())
    }
}

impl From<ImagesResponse> for ImageResults {
    fn from(response: ImagesResponse) -> Self {
        let total = response.data.len();
        let images: Vec<GeneratedImage> = response
            .data
            .into_iter()
            .filter_map(|data| {
                let key = data.url.clone().or_else(|| data.b64_json.clone())?;
                Some(GeneratedImage {
                    key,
                    url: data.url,
                    b64_json: data.b64_json,
                })
            })
            .collect();

        Self {
            created: response.created,
            skipped: total - images.len(),
            images,
        }
    }
}

impl Index<usize> for ImageResults {
    type Output = GeneratedImage;

    fn index(&self, index: usize) -> &Self::Output {
        &self.images[index]
    }
}

impl IntoIterator for ImageResults {
    type Item = GeneratedImage;
    type IntoIter = std::vec::IntoIter<GeneratedImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.into_iter()
    }
}

impl<'a> IntoIterator for &'a ImageResults {
    type Item = &'a GeneratedImage;
    type IntoIter = std::slice::Iter<'a, GeneratedImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.iter()
    }
}

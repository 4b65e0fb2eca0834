use std::path::Path;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::try_join_all;
use reqwest::multipart::{Form, Part};

use crate::{
    error::{OpenAIError, Result},
    logger,
    models::{
        GeneratedImage, ImageEditRequest, ImageGenerationRequest, ImageOptions, ImageResults,
        ImageSize, ImageVariationRequest, ImagesResponse,
    },
    openai::ClientContext,
};

/// `/images`: generations, edits and variations.
#[derive(Clone)]
pub struct ImagesEndPoint {
    pub(super) context: Arc<ClientContext>,
}

impl ImagesEndPoint {
    pub(crate) fn new(context: Arc<ClientContext>) -> Self {
        Self { context }
    }

    pub async fn generate_image(
        &self,
        prompt: &str,
        n: u32,
        size: ImageSize,
    ) -> Result<ImageResults> {
        let options = ImageOptions::new().with_count(n).with_size(size);
        self.generate_image_with(ImageGenerationRequest::new(prompt, options)?)
            .await
    }

    pub async fn generate_image_with(&self, request: ImageGenerationRequest) -> Result<ImageResults> {
        let mut timer = logger::timer("images/generations");
        let response: ImagesResponse = self
            .context
            .post_json("images/generations", &request)
            .await?;
        timer.stop();
        Ok(Self::into_results(response))
    }

    /// Edits `image_path`, repainting the transparent areas of `mask_path`
    /// (or of the image itself when no mask is given).
    pub async fn create_image_edit(
        &self,
        image_path: impl AsRef<Path>,
        mask_path: Option<&Path>,
        prompt: &str,
        n: u32,
        size: ImageSize,
    ) -> Result<ImageResults> {
        let options = ImageOptions::new().with_count(n).with_size(size);
        let request = ImageEditRequest::new(
            image_path.as_ref(),
            mask_path.map(Path::to_path_buf),
            prompt,
            options,
        )?;
        self.create_image_edit_with(request).await
    }

    pub async fn create_image_edit_with(&self, request: ImageEditRequest) -> Result<ImageResults> {
        let mut form = Form::new().part("image", file_part(request.image()).await?);
        if let Some(mask) = request.mask() {
            form = form.part("mask", file_part(mask).await?);
        }
        let form = with_options(form.text("prompt", request.prompt().to_string()), request.options());

        let mut timer = logger::timer("images/edits");
        let response: ImagesResponse = self.context.post_multipart("images/edits", form).await?;
        timer.stop();
        Ok(Self::into_results(response))
    }

    pub async fn create_image_variation(
        &self,
        image_path: impl AsRef<Path>,
        n: u32,
        size: ImageSize,
    ) -> Result<ImageResults> {
        let options = ImageOptions::new().with_count(n).with_size(size);
        let request = ImageVariationRequest::new(image_path.as_ref(), options)?;
        self.create_image_variation_with(request).await
    }

    pub async fn create_image_variation_with(
        &self,
        request: ImageVariationRequest,
    ) -> Result<ImageResults> {
        let form = Form::new().part("image", file_part(request.image()).await?);
        let form = with_options(form, request.options());

        let mut timer = logger::timer("images/variations");
        let response: ImagesResponse = self
            .context
            .post_multipart("images/variations", form)
            .await?;
        timer.stop();
        Ok(Self::into_results(response))
    }

    /// Raw bytes of a generated image, fetched from its URL or decoded from
    /// the inline base64 payload.
    pub async fn download_image(&self, image: &GeneratedImage) -> Result<Vec<u8>> {
        if let Some(data) = &image.b64_json {
            return STANDARD
                .decode(data)
                .map_err(|e| OpenAIError::ResponseError(format!("Invalid base64 image: {}", e)));
        }

        match &image.url {
            Some(url) => self.context.download(url).await,
            None => Err(OpenAIError::ResponseError(
                "Generated image carries neither a url nor b64_json".into(),
            )),
        }
    }

    /// Downloads every image concurrently, keeping the result order.
    pub async fn download_all(&self, results: &ImageResults) -> Result<Vec<Vec<u8>>> {
        try_join_all(results.iter().map(|image| self.download_image(image))).await
    }

    fn into_results(response: ImagesResponse) -> ImageResults {
        let results = ImageResults::from(response);
        if results.skipped() > 0 {
            log::warn!(
                "Dropped {} image entr{} with neither url nor b64_json",
                results.skipped(),
                if results.skipped() == 1 { "y" } else { "ies" }
            );
        }
        if results.is_empty() {
            log::warn!("Request succeeded but returned no images");
        } else {
            log::info!("Received {} image(s)", results.len());
        }
        results
    }
}

async fn file_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| OpenAIError::IoError {
            path: path.to_path_buf(),
            source,
        })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.png".to_string());

    Part::bytes(bytes)
        .file_name(file_name)
        .mime_str("image/png")
        .map_err(|e| OpenAIError::RequestError(e.to_string()))
}

fn with_options(form: Form, options: &ImageOptions) -> Form {
    let form = form
        .text("n", options.n.to_string())
        .text("size", options.size.as_str())
        .text("response_format", options.response_format.as_str());

    match &options.user {
        Some(user) => form.text("user", user.clone()),
        None => form,
    }
}

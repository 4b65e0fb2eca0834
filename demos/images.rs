use openai_client::{ImageSize, OpenAIClient};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    openai_client::logger::init_with_config(
        openai_client::logger::LoggerConfig::development()
            .with_level(openai_client::logger::LogLevel::Debug),
    )?;

    let client = OpenAIClient::from_env()?;

    let results = client
        .images()
        .generate_image("A house riding a velociraptor", 1, ImageSize::Small)
        .await?;

    for (i, bytes) in client.images().download_all(&results).await?.into_iter().enumerate() {
        let path = format!("house-{}.png", i);
        std::fs::write(&path, bytes)?;
        log::info!("Saved {}", path);
    }

    if let Ok(image) = std::env::var("IMAGE_PATH") {
        let variations = client
            .images()
            .create_image_variation(Path::new(&image), 2, ImageSize::Small)
            .await?;
        for key in variations.keys() {
            println!("{}", key);
        }
    }

    Ok(())
}

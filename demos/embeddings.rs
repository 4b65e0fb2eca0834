use openai_client::{EmbeddingsRequest, OpenAIClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    openai_client::logger::init()?;

    let client = OpenAIClient::from_env()?;
    let request = EmbeddingsRequest::builder(["The quick brown fox", "jumps over the lazy dog"])
        .user("demo")
        .build()?;

    let response = client.embeddings().create_embedding_with(request).await?;
    for (i, embedding) in response.embeddings().enumerate() {
        println!("input {}: {} dimensions", i, embedding.len());
    }
    println!("tokens used: {}", response.usage.total_tokens);

    Ok(())
}

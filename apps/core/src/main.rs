// Bunsho terminal host
// Line-oriented chat driver around the concierge

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bunsho_core::concierge::{upload_receipt, SCANNING_NOTICE};
use bunsho_core::knowledge::{
    FileKnowledgeLoader, HttpKnowledgeLoader, KnowledgeBase, KnowledgeLoader,
};
use bunsho_core::text_extract::extract_text_from_file;
use bunsho_core::{AppConfig, Concierge, KnowledgeSource};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const HELP: &str = ":upload <path>  evaluate an essay file\n:clear          reset the conversation\n:quit           exit";

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

async fn load_knowledge(source: &KnowledgeSource) -> anyhow::Result<KnowledgeBase> {
    let loader: Box<dyn KnowledgeLoader> = match source {
        KnowledgeSource::File(path) => Box::new(FileKnowledgeLoader::new(path.clone())),
        KnowledgeSource::Http(url) => Box::new(HttpKnowledgeLoader::new(url.clone())),
    };
    loader
        .load()
        .await
        .with_context(|| format!("Failed to load knowledge base from {:?}", source))
}

/// Print bot messages one by one with the configured pause in between
async fn show(messages: Vec<String>, delay: Duration) {
    for (i, message) in messages.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        println!("bunsho> {}", message);
    }
}

async fn upload(concierge: &mut Concierge, path: &str, delay: Duration) {
    let file_name = std::path::Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string();

    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(e) => {
            error!("Cannot read {}: {}", path, e);
            println!("bunsho> 无法读取文件：{}", e);
            return;
        }
    };

    if let Err(alert) = concierge.check_upload(&file_name, data.len()) {
        show(vec![alert], delay).await;
        return;
    }
    println!("you> {}", upload_receipt(&file_name, data.len()));
    show(vec![SCANNING_NOTICE.to_string()], delay).await;

    let name = file_name.clone();
    let task = tokio::task::spawn_blocking(move || extract_text_from_file(&name, &data));
    let extracted = match task.await {
        Ok(result) => result,
        Err(e) => {
            error!("Extraction task failed: {}", e);
            Err(bunsho_core::AppError::Extraction(e.to_string()))
        }
    };

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    show(concierge.handle_extracted(extracted), delay).await;
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_tracing(config.log_json);
    info!("Starting Bunsho with {:?}", config.knowledge_source);

    let knowledge = load_knowledge(&config.knowledge_source).await?;
    let mut concierge = Concierge::from_config(Arc::new(knowledge), &config);
    let delay = config.response_delay();

    println!("{}", HELP);
    show(concierge.reply(""), delay).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            ":quit" | ":exit" => break,
            ":clear" => {
                concierge.clear();
                show(concierge.reply(""), delay).await;
            }
            ":help" => println!("{}", HELP),
            _ => {
                if let Some(path) = input.strip_prefix(":upload") {
                    upload(&mut concierge, path.trim(), delay).await;
                } else {
                    show(concierge.reply(input), delay).await;
                }
            }
        }
    }

    info!("Bunsho session ended");
    Ok(())
}

//! CLI output formatting utilities

use std::io::Write;

use crate::AppConfig;

/// Safely truncate a string at character boundary (not byte boundary)
///
/// Returns the string with a "..." suffix if it was truncated.
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Show only the first few characters of a secret
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        "(not set)".to_string()
    } else if secret.chars().count() <= 8 {
        "***".to_string()
    } else {
        let head: String = secret.chars().take(4).collect();
        format!("{head}***")
    }
}

/// Print configuration with secrets masked
pub fn print_config(config: &AppConfig) {
    println!("📋 TaxRAG Configuration:");
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  File output: {}", config.logging.file_output);
    println!("  Log dir: {}", config.logging.log_dir);
    println!();

    println!("🤖 LLM:");
    println!("  Endpoint: {}", config.llm_endpoint());
    println!("  Model: {}", config.llm_model());
    println!("  Key: {}", mask_secret(config.llm_key()));
    println!();

    println!("🧠 Embeddings:");
    println!("  Provider: {}", config.embeddings.provider);
    println!("  Endpoint: {}", config.embeddings.endpoint);
    println!("  Model: {}", config.embedding_model());
    println!();

    println!("📚 Vector index:");
    println!("  Index: {}", config.vector_index.index_name);
    println!(
        "  Host: {}",
        config
            .vector_index
            .host
            .as_deref()
            .unwrap_or("(resolved at startup)")
    );
    println!("  Top K: {}", config.top_k());
    println!("  Key: {}", mask_secret(&config.vector_index.api_key));
    println!();

    println!("🔤 Dictionary:");
    for rule in &config.normalizer.dictionary {
        println!("  {rule}");
    }
    println!("  Few-shot examples: {}", config.answer.examples.len());
    println!();

    println!("💬 Chat:");
    println!("  Default session: {}", config.default_session());
    println!("  Displayed messages: {}", config.chat.max_display_messages);
    println!();

    println!("🌐 Server:");
    println!("  {}:{} (CORS: {})", config.server.host, config.server.port, config.server.cors);
}

/// Print colored output functions
pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    println!("❌ {msg}");
}

pub fn print_prompt(msg: &str) {
    print!("{msg}");
    std::io::stdout().flush().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_multibyte() {
        assert_eq!(truncate_str("소득세법 제50조", 4), "소득세법...");
        assert_eq!(truncate_str("짧음", 10), "짧음");
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "(not set)");
        assert_eq!(mask_secret("short"), "***");
        assert_eq!(mask_secret("xai-1234567890"), "xai-***");
    }
}

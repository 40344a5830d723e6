use anyhow::{Context, Result};
use chefmate_core::ai::{AiCache, AiConfig};
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    /// Show how many responses are cached
    Stats,
    /// Delete every cached response
    Clear,
}

fn describe(cache: &AiCache) -> String {
    let stats = cache.stats();
    format!(
        "{} cached responses in {}",
        stats.cached_responses,
        cache.dir().display()
    )
}

pub fn run(action: CacheAction, dir: Option<PathBuf>) -> Result<()> {
    let cache = AiCache::new(dir.unwrap_or_else(AiConfig::default_cache_dir));

    match action {
        CacheAction::Stats => println!("{}", describe(&cache)),
        CacheAction::Clear => {
            let removed = cache.stats().cached_responses;
            cache
                .clear()
                .with_context(|| format!("Failed to clear {}", cache.dir().display()))?;
            println!("Removed {} cached responses", removed);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chefmate_core::ai::{CacheKey, GenerateRequest, GenerateResponse, Part, Usage};

    fn fill(cache: &AiCache, prompts: &[&str]) {
        for prompt in prompts {
            let request = GenerateRequest {
                parts: vec![Part::text(*prompt)],
                ..Default::default()
            };
            let response = GenerateResponse {
                content: "{}".to_string(),
                usage: Usage::default(),
                model: "m".to_string(),
                cached: false,
            };
            cache.put(&CacheKey::new("m", &request), &response).unwrap();
        }
    }

    #[test]
    fn stats_then_clear() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let dir = temp_dir.path().join("ai-cache");
        let cache = AiCache::new(dir.clone());
        fill(&cache, &["Lasagne", "Pho"]);

        assert!(describe(&cache).starts_with("2 cached responses in "));

        run(CacheAction::Clear, Some(dir.clone())).unwrap();
        assert!(!dir.exists());
        assert!(describe(&cache).starts_with("0 cached responses"));
    }

    #[test]
    fn clearing_a_missing_cache_is_fine() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        run(CacheAction::Clear, Some(temp_dir.path().join("never-created"))).unwrap();
    }
}

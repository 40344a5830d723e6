use anyhow::{anyhow, bail, Context, Result};
use chefmate_core::ai::{parse_model_list, AiConfig};
use chefmate_core::{GenerateParams, ImageInput, NormalizePolicy, RecipeGenerator, SourceType};
use std::io::Write;
use std::path::PathBuf;

pub struct GenerateArgs {
    pub prompt: String,
    pub source: String,
    pub image: Option<PathBuf>,
    pub stream: bool,
    pub strict: bool,
    pub cache: bool,
    pub offline: bool,
    pub models: Option<String>,
    pub output: Option<PathBuf>,
}

/// Apply command-line overrides on top of the environment configuration.
fn apply_overrides(config: &mut AiConfig, args: &GenerateArgs) -> Result<()> {
    if let Some(models) = &args.models {
        config.models = parse_model_list(models);
        if config.models.is_empty() {
            bail!("--models needs at least one model id");
        }
    }

    if (args.cache || args.offline) && config.cache_dir.is_none() {
        config.cache_dir = Some(AiConfig::default_cache_dir());
    }
    if args.offline {
        config.offline = true;
    }
    if args.strict {
        config.policy = NormalizePolicy::Strict;
    }

    Ok(())
}

fn build_params(args: &GenerateArgs) -> Result<GenerateParams> {
    let source_type = SourceType::from_str(&args.source)
        .ok_or_else(|| anyhow!("Unknown source type: {}", args.source))?;

    let mut params = GenerateParams::new(args.prompt.clone(), source_type);
    if let Some(path) = &args.image {
        let data =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let image = ImageInput::from_bytes(data).map_err(|e| anyhow!(e))?;
        params = params.with_image(image);
    }

    Ok(params)
}

pub async fn generate(args: GenerateArgs) -> Result<()> {
    let mut config = AiConfig::from_env()?;
    apply_overrides(&mut config, &args)?;

    let params = build_params(&args)?;
    let generator = RecipeGenerator::from_config(&config)?;

    let on_update = |text: &str| {
        eprint!("\r{} Zeichen empfangen", text.chars().count());
    };

    let recipe = if args.stream {
        let result = generator.generate(&params, Some(&on_update)).await;
        eprintln!();
        result?
    } else {
        generator.generate(&params, None).await?
    };

    let json = serde_json::to_string_pretty(&recipe)?;
    if let Some(path) = &args.output {
        std::fs::File::create(path)
            .and_then(|mut file| file.write_all(json.as_bytes()))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Saved {} to {}", recipe.original_name, path.display());
    }
    println!("{}", json);

    Ok(())
}

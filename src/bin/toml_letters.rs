use clap::Parser;
use letter_merge::core::renderer::derive_file_name;
use letter_merge::core::{ConfigProvider, Pipeline};
use letter_merge::domain::schema::NAME_FIELD;
use letter_merge::utils::{logger, validation::Validate};
use letter_merge::{
    BatchEngine, LetterPipeline, LocalStorage, OutputMode, SofficeConverter, TomlConfig,
};
use std::collections::HashMap;

#[derive(Parser)]
#[command(name = "toml-letters")]
#[command(about = "Letter generation driven by a TOML job file")]
struct Args {
    /// Path to TOML job file
    #[arg(short, long, default_value = "letter-job.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override output mode from the job file
    #[arg(long, value_enum)]
    mode: Option<OutputMode>,

    /// Dry run - read and check the data, show the plan, write nothing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load job file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_cli_logger(
        args.verbose || config.verbose_logging(),
        config.json_logging(),
    );

    tracing::info!("🚀 Starting TOML-based letter generation");
    tracing::info!("📁 Loaded job file: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(mode) = args.mode {
        config.output.mode = Some(mode);
        tracing::info!("🔧 Output mode overridden to: {}", mode.label());
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Job file loaded and validated successfully");

    display_config_summary(&config, &args);

    let storage = LocalStorage::new(config.output_path().to_string());
    let converter = SofficeConverter::new(config.converter_command());
    let pipeline = LetterPipeline::new(storage, config, converter);

    let outcome = if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No files will be written");
        perform_dry_run(&pipeline).await
    } else {
        let engine = BatchEngine::new(pipeline);
        engine.run().await.map(|report| {
            tracing::info!("✅ Letters generated successfully!");
            println!("✅ {}", report.summary);
            println!("📁 Archive saved to: {}", report.output_path);
        })
    };

    if let Err(e) = outcome {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ Letter generation failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        std::process::exit(e.severity().exit_code());
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Job Summary:");
    match &config.job.version {
        Some(version) => println!("  Job: {} v{}", config.job.name, version),
        None => println!("  Job: {}", config.job.name),
    }
    if let Some(description) = &config.job.description {
        println!("  Description: {}", description);
    }
    println!("  Dataset: {}", config.dataset_path());
    println!("  Template: {}", config.template_path());
    println!(
        "  Output: {}/{}",
        config.output_path(),
        config.archive_name()
    );
    println!("  Mode: {}", config.output_mode().label());
    if config.output_mode().wants_conversion() {
        println!(
            "  Converter: {} (timeout {}s)",
            config.converter_command(),
            config.conversion_timeout().as_secs()
        );
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(
    pipeline: &LetterPipeline<LocalStorage, TomlConfig>,
) -> letter_merge::Result<()> {
    let input = pipeline.extract().await?;
    let name_format = pipeline.config().name_format();

    println!("🔍 Dry Run Analysis:");
    println!();
    println!("📊 Records: {}", input.dataset.len());
    println!("📑 Columns: {}", input.dataset.columns.len());
    if !input.dataset.skipped_rows.is_empty() {
        let rows: Vec<String> = input.dataset.skipped_rows.iter().map(|r| r.to_string()).collect();
        println!("⚠️  Blank rows skipped: {}", rows.join(", "));
    }
    println!();
    println!("📝 Planned letters:");

    let mut seen: HashMap<String, usize> = HashMap::new();
    for record in &input.dataset.records {
        let file_name = derive_file_name(name_format, &record.text(NAME_FIELD));
        if file_name.is_empty() {
            println!("  ⚠️  (empty file name for '{}')", record.text(NAME_FIELD));
            continue;
        }
        println!("  {}", file_name);
        *seen.entry(file_name).or_default() += 1;
    }

    // 同名檔案會互相覆蓋，事先提醒
    let mut collisions: Vec<_> = seen.into_iter().filter(|(_, n)| *n > 1).collect();
    collisions.sort();
    if !collisions.is_empty() {
        println!();
        println!("⚠️  Duplicate file names (later rows overwrite earlier ones):");
        for (name, count) in collisions {
            println!("  {} x{}", name, count);
        }
    }

    println!();
    println!("✅ Dry run analysis complete. Nothing was written.");

    Ok(())
}

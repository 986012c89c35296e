use clap::Parser;
use letter_merge::utils::{logger, validation::Validate};
use letter_merge::{BatchEngine, CliConfig, LetterPipeline, LocalStorage, SofficeConverter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose, config.log_json);

    if config.list_columns {
        for field in &config.schema.required_fields {
            println!("{}", field);
        }
        return Ok(());
    }

    tracing::info!("Starting letter-merge CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let json_output = config.json;

    // 創建存儲、轉檔器和管道
    let storage = LocalStorage::new(config.output_path.clone());
    let converter = SofficeConverter::new(config.converter.clone());
    let pipeline = LetterPipeline::new(storage, config, converter);

    let engine = BatchEngine::new(pipeline);

    match engine.run().await {
        Ok(report) => {
            tracing::info!("✅ Letters generated successfully!");
            tracing::info!("📁 Archive saved to: {}", report.output_path);
            if json_output {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("✅ {}", report.summary);
                println!("📁 Archive saved to: {}", report.output_path);
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Letter generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}

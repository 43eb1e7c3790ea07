//! DocShield CLI
//!
//! Command-line interface for analyzing documents for personal
//! information exposure, masking them, and browsing past analyses.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use docshield_analysis::{
    Analyzer, FileReport, Masker, Pipeline, RemoteAnalyzer, legal_summary,
};
use docshield_core::{CancelFlag, StatusSink};
use docshield_extract::{PlainTextExtractor, TextExtractor};
use docshield_history::{AnalysisHistory, HistoryRecord};
use docshield_remote::{OllamaClient, OllamaConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "docshield")]
#[command(about = "DocShield - 문서 개인정보 탐지 및 위험도 분석", long_about = None)]
struct Cli {
    /// Path to the analysis history file
    #[arg(long, global = true, default_value = "~/.docshield/history.json")]
    history_path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RemoteOpts {
    /// Ollama model for deep analysis; rule-based only when omitted
    #[arg(long)]
    model: Option<String>,

    /// Ollama server URL
    #[arg(long, default_value = "http://localhost:11434")]
    ollama_url: String,
}

#[derive(Args)]
struct PatternOpts {
    /// Extra detection pattern as NAME=REGEX; repeatable
    #[arg(long = "pattern", value_name = "NAME=REGEX")]
    patterns: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one document
    Analyze {
        file: PathBuf,

        #[command(flatten)]
        remote: RemoteOpts,

        #[command(flatten)]
        patterns: PatternOpts,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Also print a masked copy of the document
        #[arg(long)]
        mask: bool,
    },
    /// Analyze several documents, continuing past failures
    Batch {
        files: Vec<PathBuf>,

        #[command(flatten)]
        remote: RemoteOpts,

        #[command(flatten)]
        patterns: PatternOpts,

        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a masked copy of a document
    Mask {
        file: PathBuf,

        #[command(flatten)]
        patterns: PatternOpts,

        /// Output path; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Browse the analysis history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Show recent analyses
    Show {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Delete every record
    Clear,
    /// Aggregate statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    let history = AnalysisHistory::new(
        shellexpand::tilde(&cli.history_path).to_string(),
    );

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("중단 요청을 받았습니다...");
                cancel.cancel();
            }
        });
    }

    match cli.command {
        Commands::Analyze {
            file,
            remote,
            patterns,
            json,
            mask,
        } => {
            let analyzer = build_analyzer(&patterns, &remote).await?;
            let pipeline = Pipeline::new(Box::new(PlainTextExtractor::new()), analyzer)
                .with_cancel(cancel)
                .with_status(stderr_sink());

            let report = pipeline.analyze_file(&file).await?;
            record_history(&history, &report);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }

            if mask
                && let (Some(text), Some(analysis)) = (&report.text, &report.analysis)
            {
                println!(
                    "\n--- 마스킹된 문서 ---\n{}",
                    Masker::mask(text, &analysis.findings)
                );
            }
        }
        Commands::Batch {
            files,
            remote,
            patterns,
            json,
        } => {
            let analyzer = build_analyzer(&patterns, &remote).await?;
            let pipeline = Pipeline::new(Box::new(PlainTextExtractor::new()), analyzer)
                .with_cancel(cancel)
                .with_status(stderr_sink());

            let reports = pipeline.analyze_batch(&files).await?;
            for report in &reports {
                record_history(&history, report);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for report in &reports {
                    print_report(report);
                    println!();
                }
                let failed = reports.iter().filter(|r| !r.is_ok()).count();
                println!("총 {}건 중 {}건 실패", reports.len(), failed);
            }
        }
        Commands::Mask {
            file,
            patterns,
            output,
        } => {
            let analyzer = build_analyzer(&patterns, &RemoteOpts {
                model: None,
                ollama_url: String::new(),
            })
            .await?;

            let text = PlainTextExtractor::new().extract(&file)?;
            let findings = analyzer.detect_all(&text);
            let masked = analyzer.mask(&text, &findings);

            match output {
                Some(path) => {
                    std::fs::write(&path, masked)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("{}개 항목을 마스킹하여 {} 에 저장했습니다.", findings.len(), path.display());
                }
                None => println!("{masked}"),
            }
        }
        Commands::History { action } => match action {
            HistoryAction::Show { limit } => {
                let records = history.recent(limit)?;
                if records.is_empty() {
                    println!("분석 이력이 없습니다.");
                }
                for record in records {
                    println!(
                        "{}  {}  위험도 {} ({}점)  탐지 {}건  [{}]",
                        record.timestamp.format("%Y-%m-%d %H:%M"),
                        record.file_name,
                        record.result.risk_level.label(),
                        record.result.risk_score,
                        record.findings.len(),
                        record.model,
                    );
                }
            }
            HistoryAction::Clear => {
                history.clear()?;
                println!("분석 이력을 삭제했습니다.");
            }
            HistoryAction::Stats => {
                let stats = history.statistics()?;
                println!("총 분석 횟수: {}", stats.total);
                println!("평균 위험 점수: {:.1}", stats.average_score);
                println!("고위험(75점 이상) 문서: {}건", stats.high_risk_count);
            }
        },
    }

    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn stderr_sink() -> StatusSink {
    Arc::new(|msg: &str| eprintln!("[docshield] {msg}"))
}

async fn build_analyzer(
    patterns: &PatternOpts,
    remote: &RemoteOpts,
) -> anyhow::Result<Analyzer> {
    let mut analyzer = Analyzer::new();

    for entry in &patterns.patterns {
        let (name, regex) = entry
            .split_once('=')
            .context("pattern must be NAME=REGEX")?;
        analyzer
            .add_custom_pattern(name, regex)
            .with_context(|| format!("invalid pattern '{name}'"))?;
    }

    if let Some(model) = &remote.model {
        let config = OllamaConfig::new(model.clone()).with_base_url(remote.ollama_url.clone());
        let client = OllamaClient::new(config).context("failed to build Ollama client")?;
        if client.is_available().await {
            analyzer = analyzer.with_remote(Arc::new(client));
        } else {
            eprintln!("Ollama 서버에 연결할 수 없어 규칙 기반 분석만 수행합니다.");
        }
    }

    Ok(analyzer)
}

fn record_history(history: &AnalysisHistory, report: &FileReport) {
    let Some(analysis) = &report.analysis else {
        return;
    };
    let record = HistoryRecord::new(
        report
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| report.path.display().to_string()),
        analysis.result.clone(),
        analysis.findings.clone(),
        report.text.clone().unwrap_or_default(),
        analysis.model.clone(),
    );
    if let Err(err) = history.append(record) {
        tracing::warn!(error = %err, "failed to record history");
    }
}

fn print_report(report: &FileReport) {
    println!("파일: {}", report.path.display());

    let Some(analysis) = &report.analysis else {
        println!("  오류: {}", report.error.as_deref().unwrap_or("알 수 없음"));
        return;
    };

    let result = &analysis.result;
    println!(
        "위험도: {} ({}점 / 100점)  [모델: {}]",
        result.risk_level.label(),
        result.risk_score,
        analysis.model,
    );
    println!("\n{}", result.reasoning);

    if !analysis.findings.is_empty() {
        println!("\n탐지된 개인정보 ({}건):", analysis.findings.len());
        for finding in &analysis.findings {
            println!("  - {}: {}", finding.info_type.label(), finding.value);
        }
    }

    let summary = legal_summary(&analysis.findings);
    if !summary.is_empty() {
        println!("\n법적 분류:");
        for category in &summary {
            println!(
                "  {} {}건 | {} ({})",
                category.category.label(),
                category.count,
                category.statute,
                category.requirement,
            );
        }
    }

    if !result.legal_violations.is_empty() {
        println!("\n법 위반 가능성:");
        for violation in &result.legal_violations {
            println!("  - {}", violation.label());
        }
    }

    println!("\n권고사항:");
    for (index, recommendation) in result.recommendations.iter().enumerate() {
        println!("  {}. {}", index + 1, recommendation);
    }
}

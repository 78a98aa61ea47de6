use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use latest_snapshot::analytics::{gerber_cor_cov, monthly_returns};
use latest_snapshot::config::{self, ApplicationConfig, ConfigLoader, Environment};
use latest_snapshot::data_ingestion::validator::ReportFormatter;
use latest_snapshot::data_ingestion::{
    CsvReaderConfig, OutputFormat, PriceCsvReader, SnapshotCsvReader, SnapshotLoader, SnapshotWriter,
};
use latest_snapshot::domain_types::{Engine, NullDatePolicy, QueryStyle, SelectionPolicy, TieBreak};
use latest_snapshot::monitor::init_logging;
use latest_snapshot::selector::{rank_partitions, selector_for, LatestSnapshotQuery, SelectorOptions};

#[derive(Parser)]
#[command(name = "latest_snapshot", about = "每個投資組合的最新快照選取工具", version)]
struct Cli {
    /// 配置目錄（預設為 CONFIG_DIR 或 config）
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// 投資組合欄位名稱
    #[arg(long, global = true)]
    portfolio_column: Option<String>,

    /// 基準日欄位名稱
    #[arg(long, global = true)]
    as_of_column: Option<String>,

    /// CSV 分隔符
    #[arg(long, global = true)]
    delimiter: Option<char>,

    #[command(subcommand)]
    command: Commands,
}

/// 選取相關參數，未指定時使用配置值
#[derive(clap::Args)]
struct SelectionArgs {
    /// 選取策略 (strict 或 all-at-max)
    #[arg(long)]
    policy: Option<SelectionPolicy>,

    /// 空基準日的處理方式 (oldest、newest 或 reject)
    #[arg(long)]
    null_dates: Option<NullDatePolicy>,

    /// Strict 同日並列時的次要排序欄位
    #[arg(long)]
    tie_break: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 選出每個投資組合的最新記錄
    Select {
        /// 輸入 CSV 檔案
        #[arg(short, long)]
        input: PathBuf,

        /// 輸出檔案（預設為標準輸出）
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        selection: SelectionArgs,

        /// 計算引擎 (memory 或 polars)
        #[arg(long)]
        engine: Option<Engine>,

        /// 輸出格式 (csv 或 json)
        #[arg(long, default_value = "csv")]
        format: OutputFormat,
    },

    /// 列出每一列的 ROW_NUMBER 與 RANK
    Ranks {
        /// 輸入 CSV 檔案
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// 產生等價的 SQL 查詢
    Sql {
        /// 資料表名稱
        #[arg(long)]
        table: Option<String>,

        /// 輸出欄位（逗號分隔，預設為全部）
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        #[command(flatten)]
        selection: SelectionArgs,

        /// 代表輸入順序的欄位
        #[arg(long)]
        row_id: Option<String>,

        /// 查詢形式 (subquery 或 cte)
        #[arg(long)]
        style: Option<QueryStyle>,
    },

    /// 驗證快照檔案並輸出報告
    Validate {
        /// 輸入 CSV 檔案
        #[arg(short, long)]
        input: PathBuf,

        /// 空基準日的處理方式
        #[arg(long)]
        null_dates: Option<NullDatePolicy>,

        /// 以 JSON 輸出報告
        #[arg(long)]
        json: bool,
    },

    /// 由價格檔計算月報酬的 Gerber 相關係數與共變異數
    Gerber {
        /// 價格 CSV 檔案
        #[arg(short, long)]
        prices: PathBuf,

        /// 門檻倍數
        #[arg(long)]
        threshold: Option<f64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化配置
    let config_dir = cli.config_dir.clone().unwrap_or_else(ConfigLoader::config_dir);
    let app_config = ApplicationConfig::load_from(&config_dir, Environment::from_env())
        .with_context(|| format!("無法加載配置: {}", config_dir.display()))?;
    let app_config = config::init_config(app_config);

    // 初始化日誌系統；guard 需存活到結束
    let _log_guard = init_logging(&app_config.log)?;

    let reader_config = reader_config(&cli, app_config);

    match cli.command {
        Commands::Select {
            input,
            output,
            selection,
            engine,
            format,
        } => {
            let table = SnapshotCsvReader::new(reader_config.clone())
                .read_file(&input)
                .with_context(|| format!("讀取快照失敗: {}", input.display()))?;

            let options = selection_options(&selection, app_config);
            let selector = selector_for(engine.unwrap_or(app_config.selection.engine), options);
            info!(
                "使用 {} 引擎選取 ({})，輸入 {} 列",
                selector.name(),
                selector.options().policy,
                table.len()
            );
            let latest = selector.select(&table)?;
            info!("選出 {} 列，{} 個投資組合", latest.len(), latest.portfolios().len());

            let writer = SnapshotWriter::new(format).with_delimiter(reader_config.delimiter);
            match output {
                Some(path) => writer
                    .write_file(&latest, &path)
                    .with_context(|| format!("寫出結果失敗: {}", path.display()))?,
                None => writer.write(&latest, io::stdout().lock())?,
            }
        }

        Commands::Ranks { input, selection } => {
            let table = SnapshotCsvReader::new(reader_config)
                .read_file(&input)
                .with_context(|| format!("讀取快照失敗: {}", input.display()))?;

            let ranked = rank_partitions(&table, &selection_options(&selection, app_config))?;
            let mut writer = csv::Writer::from_writer(io::stdout().lock());
            for row in &ranked {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }

        Commands::Sql {
            table,
            columns,
            selection,
            row_id,
            style,
        } => {
            let options = selection_options(&selection, app_config);
            let columns_empty = columns.is_empty();
            let mut query = LatestSnapshotQuery::new(table.unwrap_or_else(|| app_config.sql.table.clone()))
                .with_key_columns(&reader_config.portfolio_column, &reader_config.as_of_column)
                .with_columns(columns)
                .with_options(options)
                .with_style(style.unwrap_or(app_config.sql.style));

            if let Some(row_id) = row_id.or_else(|| app_config.sql.row_id_column.clone()) {
                query = query.with_row_id(row_id);
            }
            if columns_empty {
                warn!("未指定輸出欄位，結果會多出視窗欄位 {}", query.rank_column());
            }

            println!("{};", query.to_sql()?);
        }

        Commands::Validate {
            input,
            null_dates,
            json,
        } => {
            let null_dates = null_dates.unwrap_or(app_config.selection.null_dates);
            let loaded = SnapshotLoader::new(reader_config, null_dates).load(&input)?;

            if json {
                println!("{}", ReportFormatter::format_json(&loaded.report)?);
            } else {
                print!("{}", ReportFormatter::format_text(&loaded.report));
            }
            io::stdout().flush()?;

            if !loaded.report.is_valid() {
                bail!("{} 筆記錄未通過驗證", loaded.report.invalid_records);
            }
        }

        Commands::Gerber { prices, threshold } => {
            let threshold = threshold.unwrap_or(app_config.analytics.gerber_threshold);
            let table = PriceCsvReader::new(&app_config.analytics.date_column)
                .with_delimiter(reader_config.delimiter)
                .read_file(&prices)
                .with_context(|| format!("讀取價格檔失敗: {}", prices.display()))?;

            let returns = monthly_returns(&table)?;
            if returns.is_empty() {
                warn!("價格資料不足以計算月報酬");
            }
            let matrices = gerber_cor_cov(&returns.values, threshold)?;

            let to_rows = |m: &ndarray::Array2<f64>| m.outer_iter().map(|r| r.to_vec()).collect::<Vec<_>>();
            let output = serde_json::json!({
                "tickers": returns.tickers,
                "months": returns.months.len(),
                "threshold": threshold,
                "correlation": to_rows(&matrices.correlation),
                "covariance": to_rows(&matrices.covariance),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// 合併配置與命令行參數
fn reader_config(cli: &Cli, app_config: &ApplicationConfig) -> CsvReaderConfig {
    let delimiter = match cli.delimiter {
        Some(c) if c.is_ascii() => c as u8,
        Some(c) => {
            warn!("分隔符 {:?} 不是 ASCII 字元，改用配置值", c);
            app_config.csv.delimiter_byte()
        }
        None => app_config.csv.delimiter_byte(),
    };

    CsvReaderConfig {
        delimiter,
        portfolio_column: cli
            .portfolio_column
            .clone()
            .unwrap_or_else(|| app_config.csv.portfolio_column.clone()),
        as_of_column: cli
            .as_of_column
            .clone()
            .unwrap_or_else(|| app_config.csv.as_of_column.clone()),
        date_formats: app_config.csv.date_formats.clone(),
    }
}

fn selection_options(args: &SelectionArgs, app_config: &ApplicationConfig) -> SelectorOptions {
    let mut options = app_config.selection.options();
    if let Some(policy) = args.policy {
        options.policy = policy;
    }
    if let Some(null_dates) = args.null_dates {
        options.null_dates = null_dates;
    }
    if args.tie_break.is_some() {
        options.tie_break = TieBreak::from_column(args.tie_break.as_deref());
    }
    options
}

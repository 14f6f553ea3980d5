use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use quiz_shorts::config::VideoSettings;
use quiz_shorts::ffmpeg::EncodeSettings;
use quiz_shorts::{setup_logging, FfmpegRunner, QuestionSet, QuizVideo, ReframeOptions};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "quiz-shorts", version, about = "Génère des vidéos quiz courtes")]
struct Cli {
    /// Подробный лог
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Сгенерировать и сохранить один ролик
    Generate {
        #[arg(long, default_value = "config/settings.json")]
        config: PathBuf,
        /// Тема вместо случайной
        #[arg(long)]
        theme: Option<String>,
        #[arg(long)]
        questions: Option<usize>,
        /// Не удалять временные файлы
        #[arg(long)]
        keep_temp: bool,
    },
    /// Убрать повторяющиеся вопросы из JSON файла
    Dedup {
        file: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Перевести горизонтальное видео в формат 9:16
    Reframe {
        input: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        start: Option<f64>,
        #[arg(long)]
        end: Option<f64>,
        /// Размытый фон вместо обрезки
        #[arg(long)]
        blur: bool,
        #[arg(long, default_value_t = 20)]
        radius: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    match cli.command {
        Command::Generate {
            config,
            theme,
            questions,
            keep_temp,
        } => generate(config, theme, questions, keep_temp).await,
        Command::Dedup { file, output } => dedup(file, output),
        Command::Reframe {
            input,
            output,
            start,
            end,
            blur,
            radius,
        } => reframe(input, output, start, end, blur, radius).await,
    }
}

async fn generate(
    config: PathBuf,
    theme: Option<String>,
    questions: Option<usize>,
    keep_temp: bool,
) -> anyhow::Result<()> {
    let mut generator = QuizVideo::from_config(&config)
        .with_context(|| format!("failed to load {}", config.display()))?
        .with_keep_temp(keep_temp)
        .with_progress_callback(Box::new(|progress, status| {
            println!("[{:>3.0}%] {}", progress, status);
        }));
    if let Some(theme) = theme {
        generator = generator.with_theme(&theme);
    }
    if let Some(questions) = questions {
        generator = generator.with_num_questions(questions);
    }

    let video = generator.generate_video().await?;
    println!(
        "{} ({} questions, {:.1}s): {}",
        video.theme, video.question_count, video.duration, video.location
    );
    Ok(())
}

fn dedup(file: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let mut set = QuestionSet::load(&file)?;
    let before = set.len();
    let removed = set.dedup();
    let target = output.unwrap_or_else(|| file.clone());
    set.save(&target)?;
    println!(
        "{}: {} -> {} questions ({} removed), saved to {}",
        file.display(),
        before,
        set.len(),
        removed,
        target.display()
    );
    Ok(())
}

async fn reframe(
    input: PathBuf,
    output: Option<PathBuf>,
    start: Option<f64>,
    end: Option<f64>,
    blur: bool,
    radius: u32,
) -> anyhow::Result<()> {
    if !input.exists() {
        bail!("input not found: {}", input.display());
    }
    let output = output.unwrap_or_else(|| {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());
        input.with_file_name(format!("{}_vertical.mp4", stem))
    });

    let video = VideoSettings::default();
    let options = ReframeOptions {
        width: video.width,
        height: video.height,
        start,
        end,
        blur,
        blur_radius: radius,
        encode: EncodeSettings::from_video_settings(&video),
    };
    FfmpegRunner::new()
        .reframe_vertical(&input, &output, &options)
        .await?;
    println!("{}", output.display());
    Ok(())
}

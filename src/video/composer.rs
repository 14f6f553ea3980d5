use crate::config::{SubtitleSettings, VideoSettings};
use crate::error::{Error, Result};
use crate::ffmpeg::{EncodeSettings, FfmpegRunner};
use crate::logging::{log_debug, log_info};
use crate::subtitles::AudioCue;
use crate::video::filter::{colors, drawbox, enable_window, escape_filter_path, DrawText, FilterGraph};
use crate::video::layout::{BoxStyle, QuizLayout, TextBox};
use crate::video::timeline::SegmentTimes;
use crate::video::timer::CountdownTimer;
use std::path::{Path, PathBuf};

const BORDER_THICKNESS: u32 = 4;
const TIMER_FONT_SIZE: u32 = 150;
const AUDIO_SAMPLE_RATE: u32 = 44100;

/// Кадры одного вопроса: раскладка и ее время на шкале
#[derive(Debug, Clone)]
pub struct SceneSegment {
    pub layout: QuizLayout,
    pub times: SegmentTimes,
}

/// Все, что нужно для сборки ролика
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub segments: Vec<SceneSegment>,
    pub cues: Vec<AudioCue>,
    pub total_duration: f64,
    pub background: Option<PathBuf>,
    pub music: Option<PathBuf>,
    pub tick_sound: Option<PathBuf>,
    pub subtitles: Option<PathBuf>,
}

/// Сценарий ffmpeg: граф фильтров, файлы надписей и аргументы запуска
#[derive(Debug, Clone)]
pub struct ComposerScript {
    pub filter: String,
    pub text_files: Vec<(PathBuf, String)>,
    /// Аргументы до `-filter_complex_script`
    pub input_args: Vec<String>,
}

/// Собирает ролик одним проходом ffmpeg
pub struct VideoComposer {
    video: VideoSettings,
    subtitles: SubtitleSettings,
    runner: FfmpegRunner,
    work_dir: PathBuf,
}

impl VideoComposer {
    pub fn new<P: AsRef<Path>>(video: VideoSettings, subtitles: SubtitleSettings, runner: FfmpegRunner, work_dir: P) -> Self {
        Self {
            video,
            subtitles,
            runner,
            work_dir: work_dir.as_ref().to_path_buf(),
        }
    }

    /// Уникальное имя итогового файла
    pub fn output_file_name() -> String {
        format!("final_{}.mp4", chrono::Utc::now().timestamp_millis())
    }

    /// Строит граф фильтров и список входов
    pub fn build_script(&self, job: &RenderJob) -> Result<ComposerScript> {
        if job.segments.is_empty() {
            return Err(Error::Video("nothing to render".to_string()));
        }
        if !(job.total_duration > 0.0) {
            return Err(Error::Video(format!("invalid total duration {}", job.total_duration)));
        }

        let (w, h, fps) = (self.video.width, self.video.height, self.video.fps);
        let total = job.total_duration;
        let mut input_args = Vec::new();
        let mut graph = FilterGraph::new();
        let mut text_files = Vec::new();

        // Вход 0: фон
        match &job.background {
            Some(path) => {
                input_args.extend(["-stream_loop".to_string(), "-1".to_string(), "-i".to_string()]);
                input_args.push(path.to_string_lossy().into_owned());
            }
            None => {
                input_args.extend(["-f".to_string(), "lavfi".to_string(), "-i".to_string()]);
                input_args.push(format!(
                    "color=c={}:s={}x{}:r={}",
                    colors::FALLBACK_BACKGROUND,
                    w,
                    h,
                    fps
                ));
            }
        }

        let mut video_filters = vec![
            format!("scale={w}:{h}:force_original_aspect_ratio=increase", w = w, h = h),
            format!("crop={}:{}", w, h),
            "setsar=1".to_string(),
            format!("fps={}", fps),
            format!("trim=duration={:.3}", total),
            "setpts=PTS-STARTPTS".to_string(),
        ];

        let font = PathBuf::from(&self.video.font_path);
        for (index, segment) in job.segments.iter().enumerate() {
            let times = &segment.times;
            let question_window = (times.start, times.answer_start);
            let answer_window = (times.answer_start, times.end);

            self.draw_layout(&segment.layout, &font, question_window, index, "q", &mut video_filters, &mut text_files);
            self.draw_layout(&segment.layout.revealed(), &font, answer_window, index, "a", &mut video_filters, &mut text_files);
        }
        graph.chain(&["0:v"], &video_filters, &["scene"]);

        // Полосы таймера поверх сцены, цифры и субтитры последней цепочкой
        let mut current = "scene".to_string();
        let mut final_filters = Vec::new();
        for (index, segment) in job.segments.iter().enumerate() {
            let timer = CountdownTimer::new(segment.times.timer_duration(), w, h);
            let next = format!("v{}", index);
            self.draw_timer_bar(&mut graph, &timer, &segment.times, index, (current.as_str(), next.as_str()), total);
            self.draw_timer_digits(&timer, &segment.times, &font, &mut final_filters);
            current = next;
        }

        if let Some(srt) = &job.subtitles {
            final_filters.push(format!(
                "subtitles=filename={}:force_style='FontSize={},OutlineColour=&H000000&,Outline=3,Shadow=0,Alignment=2'",
                escape_filter_path(srt),
                self.subtitles.font_size
            ));
        }
        if final_filters.is_empty() {
            final_filters.push("null".to_string());
        }
        graph.chain(&[current.as_str()], &final_filters, &["vout"]);

        // Озвучка: входы 1..=N в порядке фрагментов
        let mut voice_labels = Vec::new();
        for (i, cue) in job.cues.iter().enumerate() {
            let input = i + 1;
            input_args.push("-i".to_string());
            input_args.push(cue.path.to_string_lossy().into_owned());
            let label = format!("n{}", i);
            graph.chain(
                &[format!("{}:a", input).as_str()],
                &[
                    format!("aresample={}", AUDIO_SAMPLE_RATE),
                    format!("adelay={}:all=1", seconds_to_ms(cue.start_time)),
                ],
                &[label.as_str()],
            );
            voice_labels.push(label);
        }
        let mut next_input = job.cues.len() + 1;

        if let Some(tick) = &job.tick_sound {
            input_args.push("-i".to_string());
            input_args.push(tick.to_string_lossy().into_owned());
            let split_labels: Vec<String> = (0..job.segments.len()).map(|i| format!("ts{}", i)).collect();
            let split_refs: Vec<&str> = split_labels.iter().map(String::as_str).collect();
            graph.chain(
                &[format!("{}:a", next_input).as_str()],
                &[format!("aresample={}", AUDIO_SAMPLE_RATE), format!("asplit={}", job.segments.len())],
                &split_refs,
            );
            for (i, segment) in job.segments.iter().enumerate() {
                let label = format!("t{}", i);
                graph.chain(
                    &[split_labels[i].as_str()],
                    &[
                        format!("atrim=duration={:.3}", segment.times.timer_duration()),
                        format!("adelay={}:all=1", seconds_to_ms(segment.times.timer_start)),
                    ],
                    &[label.as_str()],
                );
                voice_labels.push(label);
            }
            next_input += 1;
        }

        if voice_labels.is_empty() {
            return Err(Error::Video("no audio cues".to_string()));
        }
        let voice_refs: Vec<&str> = voice_labels.iter().map(String::as_str).collect();
        graph.chain(
            &voice_refs,
            &[format!("amix=inputs={}:duration=longest:normalize=0", voice_refs.len())],
            &["voice"],
        );

        let padded = [
            format!("apad=whole_dur={:.3}", total),
            format!("atrim=duration={:.3}", total),
        ];
        match &job.music {
            Some(music) => {
                input_args.extend(["-stream_loop".to_string(), "-1".to_string(), "-i".to_string()]);
                input_args.push(music.to_string_lossy().into_owned());
                graph.chain(
                    &[format!("{}:a", next_input).as_str()],
                    &[
                        format!("aresample={}", AUDIO_SAMPLE_RATE),
                        format!("volume={}", self.video.music_volume),
                    ],
                    &["music"],
                );
                let mut filters = vec!["amix=inputs=2:duration=first:normalize=0".to_string()];
                filters.extend(padded);
                graph.chain(&["voice", "music"], &filters, &["aout"]);
            }
            None => {
                graph.chain(&["voice"], &padded, &["aout"]);
            }
        }

        Ok(ComposerScript {
            filter: graph.render(),
            text_files,
            input_args,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_layout(
        &self,
        layout: &QuizLayout,
        font: &Path,
        window: (f64, f64),
        index: usize,
        phase: &str,
        filters: &mut Vec<String>,
        text_files: &mut Vec<(PathBuf, String)>,
    ) {
        for (box_index, text_box) in layout.boxes().enumerate() {
            self.draw_box(text_box, window, filters);
            for (line_index, line) in text_box.lines.iter().enumerate() {
                let path = self.work_dir.join(format!(
                    "q{}_{}_{}_{}.txt",
                    index + 1,
                    phase,
                    box_index,
                    line_index
                ));
                let text = DrawText {
                    font_file: font,
                    font_size: text_box.font_size,
                    color: colors::TEXT,
                    x: None,
                    y: text_box.line_y(line_index),
                    border: Some((2, "black")),
                };
                filters.push(text.from_file(&path, window));
                text_files.push((path, line.clone()));
            }
        }
    }

    fn draw_box(&self, text_box: &TextBox, window: (f64, f64), filters: &mut Vec<String>) {
        let (fill, border) = match text_box.style {
            BoxStyle::Normal => (colors::BOX_FILL, colors::BOX_BORDER),
            BoxStyle::Correct => (colors::CORRECT_FILL, colors::CORRECT_BORDER),
        };
        filters.push(drawbox(text_box.x, text_box.y, text_box.width, text_box.height, fill, None, window));
        filters.push(drawbox(
            text_box.x,
            text_box.y,
            text_box.width,
            text_box.height,
            border,
            Some(BORDER_THICKNESS),
            window,
        ));
    }

    /// Полоса таймера: заливка сдвигается по кадрам внутри подложки,
    /// готовая полоса накладывается на кадр только на время таймера.
    fn draw_timer_bar(
        &self,
        graph: &mut FilterGraph,
        timer: &CountdownTimer,
        times: &SegmentTimes,
        index: usize,
        (input, output): (&str, &str),
        total: f64,
    ) {
        let source = |color: &str| {
            format!(
                "color=c={}:s={}x{}:r={}:d={:.3}",
                color, timer.bar_width, timer.bar_height, self.video.fps, total
            )
        };
        let track = format!("track{}", index);
        let fill = format!("fill{}", index);
        let bar = format!("bar{}", index);

        graph.chain(&[], &[source(colors::BAR_TRACK), "format=yuva420p".to_string()], &[track.as_str()]);
        graph.chain(&[], &[source(colors::BAR_FILL)], &[fill.as_str()]);
        graph.chain(
            &[track.as_str(), fill.as_str()],
            &[format!("overlay=x='{}':y=0:eval=frame", timer.fill_offset_expr(times.timer_start))],
            &[bar.as_str()],
        );
        graph.chain(
            &[input, bar.as_str()],
            &[format!(
                "overlay=x={}:y={}:{}",
                timer.bar_x,
                timer.bar_y,
                enable_window(times.timer_start, times.answer_start)
            )],
            &[output],
        );
    }

    fn draw_timer_digits(&self, timer: &CountdownTimer, times: &SegmentTimes, font: &Path, filters: &mut Vec<String>) {
        let digit = DrawText {
            font_file: font,
            font_size: TIMER_FONT_SIZE,
            color: colors::TIMER_DIGIT,
            x: None,
            y: timer.bar_y.saturating_add(timer.bar_height).saturating_add(20),
            border: Some((3, "black")),
        };
        for (label, from, to) in timer.label_windows() {
            filters.push(digit.literal(
                &label.to_string(),
                (times.timer_start + from, times.timer_start + to),
            ));
        }
    }

    /// Пишет файлы надписей и сценарий, запускает ffmpeg
    pub async fn render<P: AsRef<Path>>(&self, job: &RenderJob, output_dir: P) -> Result<PathBuf> {
        let output_dir = output_dir.as_ref();
        let script = self.build_script(job)?;

        tokio::fs::create_dir_all(&self.work_dir).await?;
        tokio::fs::create_dir_all(output_dir).await?;

        for (path, text) in &script.text_files {
            tokio::fs::write(path, text).await?;
        }
        let script_path = self.work_dir.join("filter_complex.txt");
        tokio::fs::write(&script_path, &script.filter).await?;
        log_debug(&format!(
            "Граф фильтров: {} байт, {} надписей",
            script.filter.len(),
            script.text_files.len()
        ));

        let output = output_dir.join(Self::output_file_name());
        let mut args = script.input_args.clone();
        args.push("-filter_complex_script".to_string());
        args.push(script_path.to_string_lossy().into_owned());
        args.extend(["-map".to_string(), "[vout]".to_string(), "-map".to_string(), "[aout]".to_string()]);
        args.push("-t".to_string());
        args.push(format!("{:.3}", job.total_duration));
        args.extend(EncodeSettings::from_video_settings(&self.video).output_args());
        args.push(output.to_string_lossy().into_owned());

        log_info(&format!(
            "Сборка видео: {} вопросов, {:.1}с",
            job.segments.len(),
            job.total_duration
        ));
        self.runner.run(&args).await?;
        log_info(&format!("Видео собрано: {}", output.display()));

        Ok(output)
    }
}

fn seconds_to_ms(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0).round() as u64
}

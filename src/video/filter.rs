use std::path::Path;

/// Цвета в синтаксисе ffmpeg
pub mod colors {
    pub const BOX_FILL: &str = "black@0.6";
    pub const BOX_BORDER: &str = "white@0.8";
    pub const CORRECT_FILL: &str = "0x00FF00@0.4";
    pub const CORRECT_BORDER: &str = "0x00FF00";
    pub const TEXT: &str = "white";
    pub const BAR_TRACK: &str = "0x282C34@0.7";
    pub const BAR_FILL: &str = "0x56B6C2";
    pub const TIMER_DIGIT: &str = "0xFFD700";
    /// Фон, если видео для темы не нашлось
    pub const FALLBACK_BACKGROUND: &str = "0x1E1E2E";
}

/// Экранирует путь для аргумента фильтра (`textfile=`, `fontfile=`, `subtitles=`).
///
/// Два уровня: сначала значение опции фильтра, затем описание графа,
/// которое ffmpeg разбирает первым.
pub fn escape_filter_path(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let option = escape_chars(&normalized, &['\\', '\'', ':']);
    escape_chars(&option, &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_chars(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        if special.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Условие `enable` для полуинтервала `[from, to)`
pub fn enable_window(from: f64, to: f64) -> String {
    format!("enable='gte(t,{:.3})*lt(t,{:.3})'", from, to)
}

/// Прямоугольник `drawbox`; `thickness` `None` - заливка
pub fn drawbox(x: u32, y: u32, width: u32, height: u32, color: &str, thickness: Option<u32>, window: (f64, f64)) -> String {
    let thickness = thickness.map(|t| t.to_string()).unwrap_or_else(|| "fill".to_string());
    format!(
        "drawbox=x={}:y={}:w={}:h={}:color={}:t={}:{}",
        x,
        y,
        width,
        height,
        color,
        thickness,
        enable_window(window.0, window.1)
    )
}

/// Параметры надписи `drawtext`
#[derive(Debug, Clone)]
pub struct DrawText<'a> {
    pub font_file: &'a Path,
    pub font_size: u32,
    pub color: &'a str,
    /// `None` - по центру кадра
    pub x: Option<u32>,
    pub y: u32,
    pub border: Option<(u32, &'a str)>,
}

impl<'a> DrawText<'a> {
    /// Текст из файла, без подстановок `%{...}`
    pub fn from_file(&self, text_file: &Path, window: (f64, f64)) -> String {
        format!(
            "drawtext=textfile={}:expansion=none:{}",
            escape_filter_path(text_file),
            self.common(window)
        )
    }

    /// Короткий текст без спецсимволов, например цифра таймера
    pub fn literal(&self, text: &str, window: (f64, f64)) -> String {
        format!("drawtext=text='{}':{}", text, self.common(window))
    }

    fn common(&self, window: (f64, f64)) -> String {
        let x = self
            .x
            .map(|x| x.to_string())
            .unwrap_or_else(|| "(w-text_w)/2".to_string());
        let mut options = format!(
            "fontfile={}:fontsize={}:fontcolor={}:x={}:y={}",
            escape_filter_path(self.font_file),
            self.font_size,
            self.color,
            x,
            self.y
        );
        if let Some((width, color)) = self.border {
            options.push_str(&format!(":borderw={}:bordercolor={}", width, color));
        }
        options.push(':');
        options.push_str(&enable_window(window.0, window.1));
        options
    }
}

/// Текст `filter_complex` из цепочек с метками
#[derive(Debug, Clone, Default)]
pub struct FilterGraph {
    chains: Vec<String>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет цепочку `[inputs]f1,f2,...[outputs]`
    pub fn chain(&mut self, inputs: &[&str], filters: &[String], outputs: &[&str]) -> &mut Self {
        let labels = |names: &[&str]| -> String { names.iter().map(|n| format!("[{}]", n)).collect() };
        self.chains
            .push(format!("{}{}{}", labels(inputs), filters.join(",\n  "), labels(outputs)));
        self
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn render(&self) -> String {
        let mut script = self.chains.join(";\n");
        script.push('\n');
        script
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_filter_path() {
        assert_eq!(
            escape_filter_path(Path::new("C:\\tmp\\it's,[a].srt")),
            r"C\\:/tmp/it\\\'s\,\[a\].srt"
        );
        assert_eq!(escape_filter_path(Path::new("/tmp/q1.txt")), "/tmp/q1.txt");
        assert_eq!(escape_filter_path(Path::new("/tmp/a;b.srt")), r"/tmp/a\;b.srt");
    }

    #[test]
    fn test_drawbox() {
        let filter = drawbox(10, 20, 300, 40, colors::BOX_FILL, None, (1.0, 2.5));
        assert_eq!(
            filter,
            "drawbox=x=10:y=20:w=300:h=40:color=black@0.6:t=fill:enable='gte(t,1.000)*lt(t,2.500)'"
        );
        let border = drawbox(0, 0, 5, 5, colors::BOX_BORDER, Some(4), (0.0, 1.0));
        assert!(border.contains(":t=4:"));
    }

    #[test]
    fn test_drawtext_centered() {
        let text = DrawText {
            font_file: Path::new("/fonts/a.ttf"),
            font_size: 70,
            color: colors::TEXT,
            x: None,
            y: 400,
            border: None,
        };
        let filter = text.from_file(Path::new("/tmp/q1_0.txt"), (0.0, 3.0));
        assert!(filter.starts_with("drawtext=textfile=/tmp/q1_0.txt:expansion=none:"));
        assert!(filter.contains("x=(w-text_w)/2:y=400"));
    }

    #[test]
    fn test_graph_render() {
        let mut graph = FilterGraph::new();
        graph
            .chain(&["0:v"], &["scale=10:10".to_string()], &["bg"])
            .chain(&["1:a"], &["asplit=2".to_string()], &["s0", "s1"]);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.render(), "[0:v]scale=10:10[bg];\n[1:a]asplit=2[s0][s1]\n");
    }
}

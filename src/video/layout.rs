//! Раскладка вопроса и вариантов ответа на кадре.
//!
//! Ширина текста оценивается по средней ширине глифа, без растеризации шрифта.

use crate::config::VideoSettings;
use crate::error::{Error, Result};
use crate::quiz::Question;

/// Средняя ширина глифа относительно размера шрифта
pub const GLYPH_WIDTH_RATIO: f64 = 0.6;
/// Межстрочный интервал относительно размера шрифта
pub const LINE_HEIGHT_RATIO: f64 = 1.2;
/// Доля ширины кадра, доступная тексту
pub const MAX_TEXT_WIDTH_RATIO: f64 = 0.8;
/// Вертикальная позиция вопроса относительно высоты кадра
pub const QUESTION_Y_RATIO: f64 = 0.1;

/// Переносит текст по словам так, чтобы строка помещалась в `max_width` пикселей
pub fn wrap_text(text: &str, font_size: u32, max_width: u32) -> Vec<String> {
    let glyph = (font_size as f64 * GLYPH_WIDTH_RATIO).max(1.0);
    let max_chars = ((max_width as f64 / glyph).floor() as usize).max(1);

    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let current_len = current.chars().count();

        if current.is_empty() {
            current.push_str(word);
        } else if current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }

        // Слово длиннее строки режется
        while current.chars().count() > max_chars {
            let head: String = current.chars().take(max_chars).collect();
            let tail: String = current.chars().skip(max_chars).collect();
            lines.push(head);
            current = tail;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Стиль блока текста
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxStyle {
    /// Полупрозрачный черный фон, белая рамка
    Normal,
    /// Полупрозрачный зеленый фон, зеленая рамка
    Correct,
}

/// Блок текста с фоном, координаты в пикселях кадра
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub lines: Vec<String>,
    pub font_size: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub padding: u32,
    pub style: BoxStyle,
}

impl TextBox {
    pub fn new(text: &str, font_size: u32, max_text_width: u32, padding: u32) -> Self {
        let lines = wrap_text(text, font_size, max_text_width);
        let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let text_width = (longest as f64 * font_size as f64 * GLYPH_WIDTH_RATIO).ceil() as u32;
        let line_count = u32::try_from(lines.len()).unwrap_or(u32::MAX);
        let padding_total = padding.saturating_mul(2);

        Self {
            height: line_count
                .saturating_mul(Self::line_height_for(font_size))
                .saturating_add(padding_total),
            width: text_width.min(max_text_width).saturating_add(padding_total),
            lines,
            font_size,
            x: 0,
            y: 0,
            padding,
            style: BoxStyle::Normal,
        }
    }

    fn line_height_for(font_size: u32) -> u32 {
        (font_size as f64 * LINE_HEIGHT_RATIO).round() as u32
    }

    pub fn line_height(&self) -> u32 {
        Self::line_height_for(self.font_size)
    }

    /// Верхний край строки `index` внутри кадра
    pub fn line_y(&self, index: usize) -> u32 {
        let index = u32::try_from(index).unwrap_or(u32::MAX);
        self.y
            .saturating_add(self.padding)
            .saturating_add(index.saturating_mul(self.line_height()))
    }

    /// Текст блока, строки через перевод строки
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn center(&mut self, frame_width: u32, y: u32) {
        self.x = frame_width.saturating_sub(self.width) / 2;
        self.y = y;
    }
}

/// Положение вопроса и четырех вариантов на кадре
#[derive(Debug, Clone, PartialEq)]
pub struct QuizLayout {
    pub question: TextBox,
    pub choices: Vec<TextBox>,
    /// Индекс правильного варианта (с нуля)
    pub correct: usize,
}

impl QuizLayout {
    /// Вопрос сверху на 10% высоты, варианты ниже с отступом `spacing`
    pub fn compute(question: &Question, settings: &VideoSettings) -> Result<Self> {
        question.validate()?;
        let correct = question
            .answer_index()
            .map(|i| i - 1)
            .ok_or_else(|| Error::Video(format!("bad answer key {}", question.answer)))?;

        let max_text_width = (settings.width as f64 * MAX_TEXT_WIDTH_RATIO) as u32;

        let mut question_box = TextBox::new(
            &question.question,
            settings.question_font_size,
            max_text_width,
            settings.box_padding,
        );
        question_box.center(settings.width, (settings.height as f64 * QUESTION_Y_RATIO) as u32);

        let mut y = question_box
            .y
            .saturating_add(question_box.height)
            .saturating_add(settings.spacing);
        let mut choices = Vec::with_capacity(4);
        for (key, choice) in question.ordered_choices() {
            let mut choice_box = TextBox::new(
                &format!("{}. {}", key, choice),
                settings.choice_font_size,
                max_text_width,
                settings.box_padding,
            );
            choice_box.center(settings.width, y);
            y = y.saturating_add(choice_box.height).saturating_add(settings.spacing);
            choices.push(choice_box);
        }

        if y > settings.height {
            crate::logging::log_warning(&format!(
                "Текст вопроса выходит за кадр: {}px из {}px",
                y, settings.height
            ));
        }

        Ok(Self {
            question: question_box,
            choices,
            correct,
        })
    }

    /// Та же раскладка с подсвеченным правильным вариантом
    pub fn revealed(&self) -> Self {
        let mut layout = self.clone();
        if let Some(choice) = layout.choices.get_mut(self.correct) {
            choice.style = BoxStyle::Correct;
        }
        layout
    }

    pub fn boxes(&self) -> impl Iterator<Item = &TextBox> {
        std::iter::once(&self.question).chain(self.choices.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text() {
        // 100px / (10 * 0.6) = 16 символов в строке
        let lines = wrap_text("Quelle est la capitale de la France ?", 10, 100);
        assert_eq!(lines, vec!["Quelle est la", "capitale de la", "France ?"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 16));
    }

    #[test]
    fn test_wrap_long_word() {
        let lines = wrap_text("anticonstitutionnellement", 10, 60);
        assert_eq!(lines, vec!["anticonsti", "tutionnell", "ement"]);
        assert!(wrap_text("   ", 10, 60).is_empty());
    }

    #[test]
    fn test_layout_positions() {
        let settings = VideoSettings::default();
        let question = Question::new("Capitale ?", ["Lyon", "Paris", "Nice", "Lille"], "2");
        let layout = QuizLayout::compute(&question, &settings).unwrap();

        assert_eq!(layout.question.y, 192);
        assert_eq!(layout.choices.len(), 4);
        assert_eq!(layout.correct, 1);

        let first = &layout.choices[0];
        assert_eq!(first.y, layout.question.y + layout.question.height + settings.spacing);
        assert_eq!(first.lines, vec!["1. Lyon"]);
        assert_eq!(first.x, (settings.width - first.width) / 2);

        let second = &layout.choices[1];
        assert_eq!(second.y, first.y + first.height + settings.spacing);
    }

    #[test]
    fn test_oversized_settings_do_not_overflow() {
        let settings = VideoSettings {
            question_font_size: u32::MAX,
            choice_font_size: u32::MAX / 2,
            box_padding: u32::MAX,
            spacing: u32::MAX,
            ..VideoSettings::default()
        };
        let question = Question::new("Capitale de la France ?", ["Lyon", "Paris", "Nice", "Lille"], "2");
        let layout = QuizLayout::compute(&question, &settings).unwrap();

        assert_eq!(layout.question.height, u32::MAX);
        assert_eq!(layout.question.width, u32::MAX);
        assert_eq!(layout.choices[3].y, u32::MAX);
        assert_eq!(layout.question.line_y(3), u32::MAX);
    }

    #[test]
    fn test_line_y() {
        let text_box = TextBox::new("Capitale ?", 50, 800, 20);
        assert_eq!(text_box.line_y(0), 20);
        assert_eq!(text_box.line_y(2), 20 + 2 * 60);
    }

    #[test]
    fn test_revealed_highlights_correct_choice() {
        let settings = VideoSettings::default();
        let question = Question::new("Capitale ?", ["Lyon", "Paris", "Nice", "Lille"], "2");
        let revealed = QuizLayout::compute(&question, &settings).unwrap().revealed();

        assert_eq!(revealed.choices[1].style, BoxStyle::Correct);
        assert_eq!(revealed.choices[0].style, BoxStyle::Normal);
        assert_eq!(revealed.question.style, BoxStyle::Normal);
    }
}

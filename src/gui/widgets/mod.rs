use iced::{
    Background, Color, Element, Font, Length, Theme, border, font,
    widget::{button, container, container::Style, text},
};
use iced_widget::container::bordered_box;

use crate::preview::{PREVIEW_HEIGHT, PREVIEW_PADDING, PREVIEW_WIDTH};

const ACCENT: Color = Color::from_rgb8(0x00, 0x78, 0xd7);
const ACCENT_HOVER: Color = Color::from_rgb8(0x00, 0x5f, 0xa3);
const RESULT_COLOR: Color = Color::from_rgb8(0x00, 0xff, 0xcc);
const BACKGROUND: Color = Color::from_rgb8(0x1e, 0x1e, 0x1e);

const BOLD: Font = Font {
    weight: font::Weight::Bold,
    ..Font::DEFAULT
};

pub fn window_style(_theme: &Theme) -> Style {
    Style::default().background(BACKGROUND).color(Color::WHITE)
}

fn preview_style(theme: &Theme) -> Style {
    bordered_box(theme)
        .border(border::rounded(10).width(0))
        .background(Color::WHITE)
}

fn action_style(_theme: &Theme, status: button::Status) -> button::Style {
    let background = match status {
        button::Status::Hovered | button::Status::Pressed => ACCENT_HOVER,
        button::Status::Disabled => ACCENT.scale_alpha(0.5),
        button::Status::Active => ACCENT,
    };

    button::Style {
        background: Some(Background::Color(background)),
        text_color: Color::WHITE,
        border: border::rounded(8),
        ..button::Style::default()
    }
}

/// Blue rounded action button. `None` renders it disabled.
pub fn action_button<'a, Message>(label: &'a str, on_press: Option<Message>) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    button(text(label).size(14).font(BOLD))
        .padding([8, 16])
        .style(action_style)
        .on_press_maybe(on_press)
        .into()
}

/// White frame holding either the preview image or a hint
pub fn preview_frame<'a, Message>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message>
where
    Message: 'a,
{
    container(content)
        .padding(PREVIEW_PADDING as u16)
        .center_x(Length::Fixed(PREVIEW_WIDTH as f32))
        .center_y(Length::Fixed(PREVIEW_HEIGHT as f32))
        .style(preview_style)
        .into()
}

pub fn preview_hint<'a, Message>(hint: &'a str) -> Element<'a, Message>
where
    Message: 'a,
{
    text(hint).size(16).color(Color::BLACK).into()
}

/// Centred result line
pub fn result_line<'a, Message>(result: &'a str) -> Element<'a, Message>
where
    Message: 'a,
{
    container(text(result).size(18).font(BOLD).color(RESULT_COLOR))
        .center_x(Length::Fill)
        .into()
}

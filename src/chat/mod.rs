//! Chat events in, announcements out.

mod event;
mod handler;
mod sink;

pub use event::{ChatMessage, Color, ParseColorError, Player};
pub use handler::{
    ChatEventHandler, Effect, FAILURE_NOTICE, Ignored, TranslationJob, UNEXPECTED_NOTICE, announce,
};
pub use sink::{Announcement, MarkupSink, MessageSink, RecordingSink, render_markup};

use crate::frame::FrameId;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum DeckEvent {
    FrameAdded { id: FrameId, index: usize },
    FrameRemoved { id: FrameId },
    FrameContentChanged { id: FrameId },
    FrameTitleChanged { id: FrameId },
    DeckReordered,
    ActiveChanged { index: usize },
    LogoAdded { id: Uuid },
    LogoRemoved { id: Uuid },
    AmbientChanged,
}

impl fmt::Display for DeckEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckEvent::FrameAdded { id, index } => {
                write!(f, "FrameAdded id={id} index={index}")
            }
            DeckEvent::FrameRemoved { id } => write!(f, "FrameRemoved id={id}"),
            DeckEvent::FrameContentChanged { id } => write!(f, "FrameContentChanged id={id}"),
            DeckEvent::FrameTitleChanged { id } => write!(f, "FrameTitleChanged id={id}"),
            DeckEvent::DeckReordered => write!(f, "DeckReordered"),
            DeckEvent::ActiveChanged { index } => write!(f, "ActiveChanged index={index}"),
            DeckEvent::LogoAdded { id } => write!(f, "LogoAdded id={id}"),
            DeckEvent::LogoRemoved { id } => write!(f, "LogoRemoved id={id}"),
            DeckEvent::AmbientChanged => write!(f, "AmbientChanged"),
        }
    }
}

#[derive(Default)]
pub struct EventBus {
    events: Vec<DeckEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: DeckEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<DeckEvent> {
        self.events.drain(..).collect()
    }
}

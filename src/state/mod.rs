pub mod context;
mod persistence;
mod view_state;

pub use context::EditorContext;
pub use persistence::{
    FileStore,
    KeyValueStore,
    MemoryStore,
    PersistenceAdapter,
    PersistenceError,
    PersistenceResult,
    SaveScheduler,
    decode_document,
    encode_document,
};
pub use view_state::{
    GestureTrack,
    MAX_BRUSH_SIZE,
    ModalFlags,
    Playback,
    PreviewMode,
    ViewState,
    pixel_at,
};

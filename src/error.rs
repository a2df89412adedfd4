use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Negative frame number: {frame_number}")]
    NegativeFrame { frame_number: i64 },

    #[error("Invalid box {bbox:?} of class `{class_name}` in frame {frame_number}")]
    InvalidBox {
        frame_number: i64,
        class_name: String,
        bbox: [f32; 4],
    },

    #[error("Empty class name in frame {frame_number}")]
    EmptyClassName { frame_number: i64 },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Frame {got} is not after frame {last}")]
    FrameOrder { last: u64, got: u64 },

    #[error("Degenerate filter state: {0}")]
    Degenerate(String),

    #[error("Assignment could not be solved: {0}")]
    Assignment(String),

    #[error("Tracking cancelled")]
    Cancelled,

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),
}

#![deny(warnings)]
pub mod strategy;
pub mod think;

pub use strategy::{
    DifficultyProfile, GameStage, OpponentModel, Strategy, decide, detect_stage,
    should_continue_trick, should_use_seven_strategically,
};
pub use think::{ThinkHandle, Thinker};

pub mod calendar;
pub mod command;
pub mod history;
pub mod mode;
pub mod refine;
pub mod turn;

pub mod challenge;
pub mod inspect;
pub mod verify;

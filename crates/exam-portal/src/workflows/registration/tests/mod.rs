mod admit_card;
mod common;
mod export;
mod store;

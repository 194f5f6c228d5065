pub mod appsettings;
pub mod conversation;
pub mod delivery;
pub mod reminder;
pub mod scheduling;
pub mod storage;
pub mod webhook;

#[cfg(test)]
mod test_utils;

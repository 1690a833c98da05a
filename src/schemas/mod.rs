use crate::Config;

pub mod availability;
pub mod credential;
pub mod reservation;
pub mod time_block;
pub mod vocabulary;

pub trait BuildResponse<R> {
	fn build_response(self, config: &Config) -> R;
}

use std::any::Any;

/// Extracts a readable message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&str>() {
		(*s).to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"non-string panic payload".to_string()
	}
}

/// Extracts the panic message from a join error, or `None` if it was cancelled.
pub fn join_error_panic_message(err: tokio::task::JoinError) -> Option<String> {
	if err.is_panic() {
		Some(panic_message(err.into_panic().as_ref()))
	} else {
		None
	}
}

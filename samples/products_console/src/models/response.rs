/// The envelope returned by the commands of this application.
#[derive(Debug, Clone)]
pub struct Response<T> {
    pub data: Option<T>,
    pub is_success: bool,
    pub message: String,
}

impl<T> Response<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Response {
            data: Some(data),
            is_success: true,
            message: message.into(),
        }
    }
}

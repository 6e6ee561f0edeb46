/// Builds the value of an `Authorization` header for HTTP basic auth.
pub(crate) fn basic_auth(username: &str, password: &str) -> Box<str> {
    let username_password = String::from(username) + ":" + password;
    let base64 = data_encoding::BASE64.encode(username_password.as_bytes());
    (String::from("Basic ") + &base64).into()
}

/// Request header carrying the caller credential (a user email)
pub const USER_HEADER: &str = "x-user-email";

pub const APP_NAME: &str = "course-site";
pub const TOP_LEVEL_DOMAIN: &str = "org";
pub const AUTHOR: &str = "course-site";

pub const UNIX_SOCKET_FILE_NAME: &str = "course-site.sock";
pub const SERVER_CONFIG_FILE_NAME: &str = "server.toml";

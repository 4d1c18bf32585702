use clap::{Arg, Command};

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("session-secret")
                .long("session-secret")
                .help("Secret used to sign session tokens")
                .env("WARDEN_SESSION_SECRET")
                .required(true)
                .hide_env_values(true),
        )
        .arg(
            Arg::new("cookie-name")
                .long("cookie-name")
                .help("Name of the session cookie")
                .default_value("token")
                .env("WARDEN_COOKIE_NAME"),
        )
        .arg(
            Arg::new("session-ttl-seconds")
                .long("session-ttl-seconds")
                .help("Session token lifetime in seconds")
                .default_value("86400")
                .env("WARDEN_SESSION_TTL_SECONDS")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("reset-token-ttl-minutes")
                .long("reset-token-ttl-minutes")
                .help("Password reset token lifetime in minutes")
                .default_value("15")
                .env("WARDEN_RESET_TOKEN_TTL_MINUTES")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("login-window-seconds")
                .long("login-window-seconds")
                .help("Length of the login throttle window in seconds")
                .default_value("60")
                .env("WARDEN_LOGIN_WINDOW_SECONDS")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("login-max-attempts")
                .long("login-max-attempts")
                .help("Login attempts allowed per client per window")
                .default_value("5")
                .env("WARDEN_LOGIN_MAX_ATTEMPTS")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("password-work-factor")
                .long("password-work-factor")
                .help("Password hashing work factor (Argon2 time cost)")
                .default_value("2")
                .env("WARDEN_PASSWORD_WORK_FACTOR")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("frontend-base-url")
                .long("frontend-base-url")
                .help("Frontend base URL, used for CORS and password reset links")
                .default_value("http://localhost:3000")
                .env("WARDEN_FRONTEND_BASE_URL"),
        )
}

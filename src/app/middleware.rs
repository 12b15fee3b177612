use roots::http::middleware::{bearer_token, Middleware};
use roots::{Reply, RequestContext};

/// Browsers without credentials go to `/login`; API clients must present
/// the configured bearer token.
pub fn auth(api_key: &str) -> impl Middleware {
    let token = bearer_token(api_key.to_string());
    move |ctx: &RequestContext| -> Option<Reply> {
        if ctx.header("authorization").is_none() && ctx.accepts("text/html") {
            return Some(Reply::redirect("/login"));
        }
        token.handle(ctx)
    }
}

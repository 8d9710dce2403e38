// orgdesk/src/helpers/auth_helper.rs
use tera::Context;

use crate::helpers::template_helper::create_base_context;
use crate::navigation::visible_menu;
use crate::session::ResolvedSession;

/// Template context for a signed-in page: user, role and the menu filtered by
/// the session's ability.
pub fn create_base_template_context_with_auth(page_title: &str, session: &ResolvedSession) -> Context {
    let mut ctx = create_base_context();
    ctx.insert("page_title", page_title);
    ctx.insert("menus", &visible_menu(session.ability()));
    ctx.insert("current_user", session.user());
    ctx.insert("user_name", session.user().display_name());
    ctx.insert("role_name", &session.role_name());
    ctx.insert("is_authenticated", &true);
    ctx
}

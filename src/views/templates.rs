use handlebars::Handlebars;
use std::sync::Arc;

pub type Hbs = Arc<Handlebars<'static>>;

pub fn build_handlebars() -> Hbs {
    let mut hb = Handlebars::new();
    hb.set_strict_mode(false);

    // Layout + pages
    hb.register_template_file("layouts/base", "templates/layouts/base.hbs")
        .expect("template layouts/base");
    hb.register_template_file("pages/login", "templates/pages/login.hbs")
        .expect("template pages/login");
    hb.register_template_file("pages/dashboard", "templates/pages/dashboard.hbs")
        .expect("template pages/dashboard");
    hb.register_template_file("pages/not_found", "templates/pages/not_found.hbs")
        .expect("template pages/not_found");

    // Partial endpoints
    hb.register_template_file("partials/order_list", "templates/partials/order_list.hbs")
        .expect("template partials/order_list");
    hb.register_template_file("partials/toast", "templates/partials/toast.hbs")
        .expect("template partials/toast");
    hb.register_template_file("partials/delete_confirm", "templates/partials/delete_confirm.hbs")
        .expect("template partials/delete_confirm");

    // Included from other templates
    let order_card = std::fs::read_to_string("templates/partials/order_card.hbs")
        .expect("partials/order_card.hbs");
    hb.register_partial("order_card", order_card)
        .expect("register order_card partial");

    let navbar = std::fs::read_to_string("templates/partials/navbar.hbs")
        .expect("partials/navbar.hbs");
    hb.register_partial("navbar", navbar).expect("register navbar partial");

    Arc::new(hb)
}

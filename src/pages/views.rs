//! JSON view models for the site's pages.
//!
//! Rendering belongs to the front-end; these types carry exactly what each page
//! shows (copy, links, form descriptors) so a client can draw it without
//! re-deriving any of it.

use serde::Serialize;

use crate::api::v1::dto::auth::UserResponse;
use crate::middleware::guard::policy::{DASHBOARD_PATH, LOGIN_PATH};
use crate::services::catalog::Product;
use crate::services::identity::Session;

pub const NO_DESCRIPTION: &str = "No description";
pub const EMPTY_CATALOG: &str = "There are no products at the moment.";
pub const CATALOG_UNAVAILABLE: &str = "Products are unavailable right now.";

pub const SIGNUP_PATH: &str = "/auth/signup";
pub const FORGOT_PASSWORD_PATH: &str = "/auth/forgot-password";
pub const PRODUCTS_PATH: &str = "/products";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub label: &'static str,
    pub href: &'static str,
}

const fn link(label: &'static str, href: &'static str) -> Link {
    Link { label, href }
}

/// Visitors get the auth links; signed-in users get their dashboard.
pub fn nav_links(session: Option<&Session>) -> Vec<Link> {
    match session {
        Some(_) => vec![link("Products", PRODUCTS_PATH), link("Dashboard", DASHBOARD_PATH)],
        None => vec![
            link("Products", PRODUCTS_PATH),
            link("Login", LOGIN_PATH),
            link("Sign Up", SIGNUP_PATH),
        ],
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductCard {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub price_label: String,
    pub color: Option<String>,
    pub href: String,
}

impl From<Product> for ProductCard {
    fn from(p: Product) -> Self {
        let description = p
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());

        Self {
            href: format!("{PRODUCTS_PATH}/{}", p.id),
            price_label: format!("{:.2} €", p.price),
            id: p.id,
            name: p.name,
            description,
            price: p.price,
            color: p.color.filter(|c| !c.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductListView {
    pub title: &'static str,
    pub products: Vec<ProductCard>,
    /// Shown instead of the list when there is nothing to list.
    pub notice: Option<&'static str>,
}

impl ProductListView {
    pub fn new(products: Vec<Product>) -> Self {
        let notice = products.is_empty().then_some(EMPTY_CATALOG);
        Self {
            title: "Products",
            products: products.into_iter().map(ProductCard::from).collect(),
            notice,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            title: "Products",
            products: Vec::new(),
            notice: Some(CATALOG_UNAVAILABLE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeView {
    pub title: &'static str,
    pub tagline: &'static str,
    pub nav: Vec<Link>,
    pub call_to_action: Link,
    pub catalog: ProductListView,
}

impl HomeView {
    pub fn new(session: Option<&Session>, catalog: ProductListView) -> Self {
        let call_to_action = match session {
            Some(_) => link("Go to Dashboard", DASHBOARD_PATH),
            None => link("Get Started", SIGNUP_PATH),
        };
        Self {
            title: "Welcome to My App",
            tagline: "Log in or sign up to get started and manage your dashboard.",
            nav: nav_links(session),
            call_to_action,
            catalog,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDetailView {
    pub product: ProductCard,
    pub back: Link,
}

impl ProductDetailView {
    pub fn new(product: Product) -> Self {
        Self {
            product: ProductCard::from(product),
            back: link("All products", PRODUCTS_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormAction {
    pub label: &'static str,
    pub method: &'static str,
    pub action: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub title: String,
    pub body: &'static str,
    pub user: UserResponse,
    pub sign_out: FormAction,
}

impl DashboardView {
    pub fn new(session: &Session) -> Self {
        Self {
            title: format!("Welcome, {}!", session.user.email),
            body: "This is your dashboard.",
            user: UserResponse::from(&session.user),
            sign_out: FormAction {
                label: "Logout",
                method: "POST",
                action: "/api/v1/auth/signout",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub placeholder: &'static str,
    pub required: bool,
}

const fn field(
    name: &'static str,
    label: &'static str,
    kind: &'static str,
    placeholder: &'static str,
) -> FormField {
    FormField {
        name,
        label,
        kind,
        placeholder,
        required: true,
    }
}

const EMAIL_FIELD: FormField = field("email", "Email", "email", "Enter your email");
const PASSWORD_FIELD: FormField = field("password", "Password", "password", "Enter your password");

/// Descriptor for one credential form; `submit` posts JSON to the auth API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthFormView {
    pub title: &'static str,
    pub intro: Option<&'static str>,
    pub fields: Vec<FormField>,
    pub submit: FormAction,
    pub links: Vec<Link>,
}

impl AuthFormView {
    pub fn login() -> Self {
        Self {
            title: "Login",
            intro: None,
            fields: vec![EMAIL_FIELD, PASSWORD_FIELD],
            submit: FormAction {
                label: "Login",
                method: "POST",
                action: "/api/v1/auth/signin",
            },
            links: vec![
                link("Sign up", SIGNUP_PATH),
                link("Forgot your password?", FORGOT_PASSWORD_PATH),
            ],
        }
    }

    pub fn signup() -> Self {
        Self {
            title: "Create Account",
            intro: None,
            fields: vec![
                EMAIL_FIELD,
                PASSWORD_FIELD,
                field(
                    "confirm_password",
                    "Confirm Password",
                    "password",
                    "Repeat your password",
                ),
            ],
            submit: FormAction {
                label: "Sign Up",
                method: "POST",
                action: "/api/v1/auth/signup",
            },
            links: vec![link("Already have an account? Log in", LOGIN_PATH)],
        }
    }

    pub fn forgot_password() -> Self {
        Self {
            title: "Reset Password",
            intro: Some(
                "Enter your email address and we'll send you a link to reset your password.",
            ),
            fields: vec![EMAIL_FIELD],
            submit: FormAction {
                label: "Send Reset Link",
                method: "POST",
                action: "/api/v1/auth/forgot-password",
            },
            links: vec![link("Back to Login", LOGIN_PATH)],
        }
    }
}

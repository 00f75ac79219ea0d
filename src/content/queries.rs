//! GROQ query text, one constant per content operation.
//!
//! Image fields dereference their asset (`asset->`) so renderers get the
//! LQIP placeholder and mime type alongside the id.

pub const PAGE_BY_SLUG: &str = r#"*[_type == "page" && slug.current == $slug][0] {
  _id,
  title,
  slug,
  body,
  featuredImage {..., asset->{..., metadata}},
  additionalImages[] {..., asset->{..., metadata}},
  email,
  phoneNumber,
  socialLinks
}"#;

pub const PROJECT_BY_SLUG: &str = r#"*[_type == "project" && slug.current == $slug][0] {
  _id,
  title,
  slug,
  description,
  date,
  featuredImage {..., asset->{..., metadata}},
  additionalImages[] {..., asset->{..., metadata}},
  isFeatured,
  tags
}"#;

pub const FEATURED_PROJECTS: &str = r#"*[_type == "project" && isFeatured == true] | order(date desc) {
  _id,
  title,
  slug,
  date,
  featuredImage {..., asset->{..., metadata}}
}"#;

pub const PROJECTS_BY_TAG: &str = r#"*[_type == "project" && $tag in tags] | order(date desc) {
  _id,
  title,
  slug,
  date,
  featuredImage {..., asset->{..., metadata}}
}"#;

pub const SITE_SETTINGS: &str = r#"*[_type == "siteSettings" && _id == "siteSettings"][0] {
  siteTitle,
  backgroundColor,
  fontColor,
  fontLinkColor,
  favicon {..., asset->}
}"#;

pub const SITE_DESCRIPTION: &str = r#"*[_type == "siteSettings" && _id == "siteSettings"][0] {
  siteDescription
}"#;

pub const NAV_PAGES: &str = r#"*[_type == "page" && defined(slug.current)] {
  title,
  slug
}"#;

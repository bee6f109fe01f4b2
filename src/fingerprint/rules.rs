//! Built-in technology rules
//!
//! Rules are listed per category; the order here is the order in which
//! detected names appear in the report. URL and generator needles are
//! matched ASCII case-insensitively, attribute and global names exactly.

use super::Signal::*;
use super::{Category, Rule};

macro_rules! rule {
    ($category:ident, $name:literal, [$($signal:expr),+ $(,)?]) => {
        Rule {
            category: Category::$category,
            name: $name,
            signals: &[$($signal),+],
        }
    };
}

/// The default rule table
pub static RULES: &[Rule] = &[
    // cms
    rule!(Cms, "WordPress", [
        Generator("wordpress"),
        AssetUrl("/wp-content/"),
        AssetUrl("/wp-includes/"),
    ]),
    rule!(Cms, "Drupal", [
        Generator("drupal"),
        AssetUrl("/sites/default/files/"),
        AssetUrl("/core/misc/drupal"),
        AttributePrefix("data-drupal-"),
        Global("Drupal"),
    ]),
    rule!(Cms, "Joomla", [
        Generator("joomla"),
        AssetUrl("/media/jui/"),
        AssetUrl("/media/system/js/"),
        Global("Joomla"),
    ]),
    rule!(Cms, "Wix", [
        Generator("wix.com"),
        AssetUrl("static.parastorage.com"),
        AssetUrl("static.wixstatic.com"),
        Global("wixBiSession"),
    ]),
    rule!(Cms, "Squarespace", [
        Generator("squarespace"),
        AssetUrl("static1.squarespace.com"),
        AssetUrl("assets.squarespace.com"),
    ]),
    rule!(Cms, "Ghost", [
        Generator("ghost"),
        AssetUrl("/ghost/"),
    ]),
    rule!(Cms, "Webflow", [
        Generator("webflow"),
        AssetUrl("assets.website-files.com"),
        Attribute("data-wf-page"),
        Global("Webflow"),
    ]),
    // frameworks
    rule!(Frameworks, "React", [
        Attribute("data-reactroot"),
        Attribute("data-reactid"),
        Global("React"),
    ]),
    rule!(Frameworks, "Vue.js", [
        AttributePrefix("data-v-"),
        Global("Vue"),
    ]),
    rule!(Frameworks, "Angular", [
        Attribute("ng-app"),
        Attribute("ng-version"),
        Global("angular"),
        Global("ng"),
    ]),
    rule!(Frameworks, "Next.js", [
        AttributeValue("id", "__NEXT_DATA__"),
        AttributeValue("id", "__next"),
        ScriptSrc("/_next/"),
        Global("__NEXT_DATA__"),
    ]),
    rule!(Frameworks, "Nuxt.js", [
        AttributeValue("id", "__nuxt"),
        ScriptSrc("/_nuxt/"),
        Global("__NUXT__"),
        Global("$nuxt"),
    ]),
    rule!(Frameworks, "Svelte", [
        ClassPrefix("svelte-"),
        Global("__svelte"),
    ]),
    rule!(Frameworks, "Gatsby", [
        Generator("gatsby"),
        AttributeValue("id", "___gatsby"),
        Global("___loader"),
    ]),
    // analytics
    rule!(Analytics, "Google Analytics", [
        AssetUrl("google-analytics.com/analytics.js"),
        AssetUrl("google-analytics.com/ga.js"),
        AssetUrl("googletagmanager.com/gtag/js"),
        Global("ga"),
        Global("gtag"),
    ]),
    rule!(Analytics, "Google Tag Manager", [
        AssetUrl("googletagmanager.com/gtm.js"),
        Global("google_tag_manager"),
    ]),
    rule!(Analytics, "Facebook Pixel", [
        AssetUrl("connect.facebook.net"),
        Global("fbq"),
    ]),
    rule!(Analytics, "Hotjar", [
        AssetUrl("static.hotjar.com"),
        Global("hj"),
    ]),
    rule!(Analytics, "Mixpanel", [
        AssetUrl("cdn.mxpnl.com"),
        Global("mixpanel"),
    ]),
    rule!(Analytics, "Segment", [
        AssetUrl("cdn.segment.com"),
    ]),
    rule!(Analytics, "Matomo", [
        AssetUrl("matomo.js"),
        AssetUrl("piwik.js"),
        Global("_paq"),
    ]),
    rule!(Analytics, "Plausible", [
        AssetUrl("plausible.io/js"),
        Global("plausible"),
    ]),
    // advertising
    rule!(Advertising, "Google AdSense", [
        AssetUrl("pagead2.googlesyndication.com"),
        ClassPrefix("adsbygoogle"),
        Global("adsbygoogle"),
    ]),
    rule!(Advertising, "Google Ad Manager", [
        AssetUrl("securepubads.g.doubleclick.net"),
        AssetUrl("googletagservices.com/tag/js/gpt.js"),
        Global("googletag"),
    ]),
    rule!(Advertising, "Amazon Advertising", [
        AssetUrl("amazon-adsystem.com"),
        Global("apstag"),
    ]),
    rule!(Advertising, "Taboola", [
        AssetUrl("cdn.taboola.com"),
        Global("_taboola"),
    ]),
    rule!(Advertising, "Outbrain", [
        AssetUrl("widgets.outbrain.com"),
        Global("OBR"),
    ]),
    // ecommerce
    rule!(Ecommerce, "Shopify", [
        AssetUrl("cdn.shopify.com"),
        Global("Shopify"),
    ]),
    rule!(Ecommerce, "WooCommerce", [
        AssetUrl("/wp-content/plugins/woocommerce/"),
        ClassPrefix("woocommerce"),
        Global("woocommerce_params"),
    ]),
    rule!(Ecommerce, "Magento", [
        AssetUrl("/static/version"),
        AssetUrl("/skin/frontend/"),
        Attribute("data-mage-init"),
        Global("Mage"),
    ]),
    rule!(Ecommerce, "BigCommerce", [
        AssetUrl("bigcommerce.com"),
        Global("BCData"),
    ]),
    rule!(Ecommerce, "PrestaShop", [
        Generator("prestashop"),
        Global("prestashop"),
    ]),
    rule!(Ecommerce, "Stripe", [
        AssetUrl("js.stripe.com"),
        Global("Stripe"),
    ]),
    // cdn
    rule!(Cdn, "cdnjs", [
        AssetUrl("cdnjs.cloudflare.com"),
    ]),
    rule!(Cdn, "jsDelivr", [
        AssetUrl("cdn.jsdelivr.net"),
    ]),
    rule!(Cdn, "unpkg", [
        AssetUrl("unpkg.com"),
    ]),
    rule!(Cdn, "Google Hosted Libraries", [
        AssetUrl("ajax.googleapis.com"),
    ]),
    rule!(Cdn, "Amazon CloudFront", [
        AssetUrl(".cloudfront.net"),
    ]),
    rule!(Cdn, "Akamai", [
        AssetUrl("akamaihd.net"),
        AssetUrl("akamaized.net"),
    ]),
    // web servers and hosting
    rule!(WebServer, "Cloudflare", [
        AssetUrl("/cdn-cgi/"),
    ]),
    rule!(WebServer, "Vercel", [
        AssetUrl("/_vercel/"),
    ]),
    rule!(WebServer, "Netlify", [
        AssetUrl("/.netlify/"),
        Global("netlifyIdentity"),
    ]),
    // programming languages
    rule!(ProgrammingLanguages, "PHP", [
        AssetUrl(".php"),
    ]),
    rule!(ProgrammingLanguages, "ASP.NET", [
        AttributeValue("name", "__VIEWSTATE"),
        AttributeValue("id", "__VIEWSTATE"),
        AssetUrl(".aspx"),
        AssetUrl(".axd"),
    ]),
    rule!(ProgrammingLanguages, "Java", [
        AssetUrl(".jsp"),
        AttributeValue("name", "javax.faces.ViewState"),
    ]),
    rule!(ProgrammingLanguages, "Ruby", [
        MetaName("csrf-param"),
    ]),
    rule!(ProgrammingLanguages, "Python", [
        AttributeValue("name", "csrfmiddlewaretoken"),
    ]),
    // databases and backend data services
    rule!(Databases, "Firebase", [
        AssetUrl("firebaseio.com"),
        AssetUrl("/firebase"),
        Global("firebase"),
    ]),
    rule!(Databases, "Supabase", [
        AssetUrl("supabase"),
        Global("supabase"),
    ]),
    // js libraries
    rule!(JsLibraries, "jQuery", [
        AssetUrl("jquery"),
        Global("jQuery"),
    ]),
    rule!(JsLibraries, "Lodash", [
        AssetUrl("lodash"),
    ]),
    rule!(JsLibraries, "Moment.js", [
        AssetUrl("moment.min.js"),
        AssetUrl("/moment@"),
        Global("moment"),
    ]),
    rule!(JsLibraries, "Bootstrap", [
        AssetUrl("bootstrap"),
    ]),
    rule!(JsLibraries, "Font Awesome", [
        AssetUrl("font-awesome"),
        AssetUrl("fontawesome"),
    ]),
    rule!(JsLibraries, "Alpine.js", [
        Attribute("x-data"),
        Global("Alpine"),
    ]),
    rule!(JsLibraries, "GSAP", [
        AssetUrl("gsap"),
        Global("gsap"),
    ]),
    rule!(JsLibraries, "Three.js", [
        AssetUrl("three.min.js"),
        AssetUrl("/three@"),
        Global("THREE"),
    ]),
    rule!(JsLibraries, "D3.js", [
        AssetUrl("d3.min.js"),
        AssetUrl("/d3@"),
        Global("d3"),
    ]),
    rule!(JsLibraries, "Axios", [
        AssetUrl("axios"),
        Global("axios"),
    ]),
];

//! Notification email rendering.
//!
//! One fixed HTML layout with two palettes, selected by the response value.

use chrono::NaiveDateTime;

use super::model::ResponseValue;

/// Display format for the timestamp line, e.g. `Saturday, February 14, 2026 at 07:30 PM`.
pub const TIMESTAMP_FORMAT: &str = "%A, %B %-d, %Y at %I:%M %p";

/// Text and colours that differ between the two notifications.
#[derive(Debug)]
pub struct TemplateVariant {
    pub subject: &'static str,
    pub emoji: &'static str,
    pub headline: &'static str,
    pub tagline: &'static str,
    pub message: &'static str,
    pub badge_background: &'static str,
    pub badge_border: &'static str,
    pub badge_color: &'static str,
}

const ACCEPTED: TemplateVariant = TemplateVariant {
    subject: "💝 She said YES! Valentine's Response Received",
    emoji: "💝",
    headline: "She said YES!",
    tagline: "🎉 Congratulations! 🎉",
    message: "Your Valentine's Day invitation has been <strong style='color:#fb7185;'>accepted</strong>! \
              Time to plan something absolutely magical. You've got a date to prepare for! 🥂",
    badge_background: "rgba(244,63,94,0.2)",
    badge_border: "rgba(244,63,94,0.4)",
    badge_color: "#fb7185",
};

const DECLINED: TemplateVariant = TemplateVariant {
    subject: "💔 Valentine's Response — No, Thank You",
    emoji: "💔",
    headline: "She said no...",
    tagline: "💫 It's Okay",
    message: "Your Valentine's Day invitation was <strong style='color:#fda4af;'>declined</strong>. \
              Remember, every 'no' is just a 'not yet'. Stay wonderful, and maybe next time! 🌸",
    badge_background: "rgba(150,100,120,0.2)",
    badge_border: "rgba(200,100,130,0.3)",
    badge_color: "#fda4af",
};

impl ResponseValue {
    pub fn template(&self) -> &'static TemplateVariant {
        match self {
            Self::Yes => &ACCEPTED,
            Self::No => &DECLINED,
        }
    }
}

/// Subject line for a response.
pub fn render_subject(response: ResponseValue) -> String {
    response.template().subject.to_string()
}

/// Full HTML body for a response, stamped with `sent_at`.
pub fn render_html(response: ResponseValue, sent_at: NaiveDateTime) -> String {
    let v = response.template();
    let timestamp = sent_at.format(TIMESTAMP_FORMAT);
    let literal = response.as_str();

    format!(
        r##"<!DOCTYPE html>
<html>
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  </head>
  <body style="margin:0;padding:0;background:#1a0510;font-family:'Georgia',serif;">
    <table width="100%" cellpadding="0" cellspacing="0" style="background:#1a0510;padding:40px 20px;">
      <tr><td align="center">
        <table width="560" cellpadding="0" cellspacing="0" style="background:linear-gradient(145deg,#2d0a1a,#1f0614);border-radius:20px;border:1px solid rgba(255,150,180,0.2);overflow:hidden;">
          <tr>
            <td style="background:linear-gradient(135deg,#9f1239,#e11d48);padding:30px;text-align:center;">
              <div style="font-size:48px;margin-bottom:10px;">{emoji}</div>
              <h1 style="color:#fff;margin:0;font-size:24px;font-weight:400;letter-spacing:2px;">{headline}</h1>
            </td>
          </tr>
          <tr>
            <td style="padding:36px 40px;text-align:center;">
              <p style="color:#fda4af;font-size:32px;margin:0 0 16px;letter-spacing:1px;">{tagline}</p>
              <p style="color:rgba(255,200,210,0.8);font-size:16px;line-height:1.8;margin:0 0 24px;">{message}</p>
              <div style="display:inline-block;background:{badge_background};border:1px solid {badge_border};border-radius:50px;padding:10px 28px;margin-bottom:28px;">
                <span style="color:{badge_color};font-size:14px;letter-spacing:3px;text-transform:uppercase;">
                  Response: <strong>{literal}</strong>
                </span>
              </div>
              <p style="color:rgba(255,150,170,0.4);font-size:12px;letter-spacing:2px;margin:0;">{timestamp}</p>
            </td>
          </tr>
          <tr>
            <td style="background:rgba(0,0,0,0.3);padding:16px;text-align:center;">
              <p style="color:rgba(255,130,160,0.3);font-size:11px;margin:0;letter-spacing:1px;">Sent via Your Valentine's Day Card App ❤️</p>
            </td>
          </tr>
        </table>
      </td></tr>
    </table>
  </body>
</html>
"##,
        emoji = v.emoji,
        headline = v.headline,
        tagline = v.tagline,
        message = v.message,
        badge_background = v.badge_background,
        badge_border = v.badge_border,
        badge_color = v.badge_color,
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn valentines_evening() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 14)
            .unwrap()
            .and_hms_opt(19, 30, 0)
            .unwrap()
    }

    #[test]
    fn subjects_are_distinguishable() {
        let yes = render_subject(ResponseValue::Yes);
        let no = render_subject(ResponseValue::No);
        assert!(yes.contains("YES"));
        assert!(!no.contains("YES"));
        assert_ne!(yes, no);
    }

    #[test]
    fn body_embeds_literal_and_palette() {
        let yes = render_html(ResponseValue::Yes, valentines_evening());
        assert!(yes.contains("Response: <strong>YES</strong>"));
        assert!(yes.contains("💝"));
        assert!(yes.contains("rgba(244,63,94,0.2)"));
        assert!(yes.contains("accepted"));

        let no = render_html(ResponseValue::No, valentines_evening());
        assert!(no.contains("Response: <strong>NO</strong>"));
        assert!(no.contains("💔"));
        assert!(no.contains("rgba(150,100,120,0.2)"));
        assert!(no.contains("declined"));
        assert!(!no.contains("💝"));
    }

    #[test]
    fn timestamp_is_display_formatted() {
        let html = render_html(ResponseValue::Yes, valentines_evening());
        assert!(html.contains("Saturday, February 14, 2026 at 07:30 PM"));
    }

    #[test]
    fn rendering_is_deterministic_for_fixed_time() {
        let a = render_html(ResponseValue::No, valentines_evening());
        let b = render_html(ResponseValue::No, valentines_evening());
        assert_eq!(a, b);
    }
}

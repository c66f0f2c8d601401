/// HTML rendering of the transfer page
///
/// The page is rebuilt from a session snapshot on every request. While work
/// is in flight (startup, a balance fetch, a submission) it asks the browser
/// to reload itself so status updates appear without scripts.
use std::fmt::Write;

use crate::chain::{format_balance, ChainInfo};
use crate::form::{BalanceView, FailureKind, SubmissionState, TransferForm};
use crate::session::AppPhase;

const REFRESH_SECS: u32 = 2;

pub fn render(phase: &AppPhase) -> String {
    match phase {
        AppPhase::Loading => layout(
            "Loading",
            true,
            "<p class=\"notice\">Connecting to the wallet and the chain…</p>".to_string(),
        ),
        AppPhase::NoWallet { reason } => layout(
            "No wallet",
            false,
            format!("<p class=\"notice\">{}</p>", escape(reason)),
        ),
        AppPhase::StartupFailed { reason } => layout(
            "Unavailable",
            false,
            format!(
                "<p class=\"error\">Could not start: {}</p>\
                 <p>Check the node endpoint and asset id, then reload.</p>",
                escape(reason)
            ),
        ),
        AppPhase::Ready { form, chain } => {
            let busy = form.is_submitting() || *form.balance() == BalanceView::Loading;
            let title = format!("Transact {}", form.asset().symbol);
            layout(&title, busy, render_form(form, chain))
        }
    }
}

fn render_form(form: &TransferForm, chain: &ChainInfo) -> String {
    let asset = form.asset();
    let mut body = String::new();

    let _ = write!(body, "<h1>Transact {}</h1>", escape(&asset.symbol));

    // Account selector
    let selected = &form.selected_account().address;
    body.push_str("<form method=\"post\" action=\"/account\"><label>Account ");
    body.push_str("<select name=\"address\" onchange=\"this.form.submit()\">");
    for account in form.accounts() {
        let _ = write!(
            body,
            "<option value=\"{addr}\"{sel}>{name} ({addr})</option>",
            addr = escape(&account.address),
            name = escape(&account.meta.name),
            sel = if &account.address == selected { " selected" } else { "" },
        );
    }
    body.push_str("</select></label> <button type=\"submit\">Select</button></form>");

    // Balance
    let balance = match form.balance() {
        BalanceView::Loading => "loading…".to_string(),
        BalanceView::Known(raw) => format!(
            "{} {} <small>({} base units)</small>",
            format_balance(*raw, asset.decimals),
            escape(&asset.symbol),
            raw
        ),
        BalanceView::Unavailable(reason) => {
            format!("<span class=\"error\">unavailable: {}</span>", escape(reason))
        }
    };
    let _ = write!(body, "<p class=\"balance\">Balance: {}</p>", balance);

    // Transfer
    let disabled = if form.is_submitting() { " disabled" } else { "" };
    let _ = write!(
        body,
        "<form method=\"post\" action=\"/transfer\">\
         <label>Recipient <input name=\"recipient\" value=\"{recipient}\" size=\"52\"{disabled}></label>\
         <label>Amount <input name=\"amount\" value=\"{amount}\" inputmode=\"numeric\"{disabled}></label>\
         <small>in base units ({decimals} decimals)</small>\
         <button type=\"submit\"{disabled}>Transfer</button></form>",
        recipient = escape(form.recipient()),
        amount = escape(form.amount()),
        decimals = asset.decimals,
        disabled = disabled,
    );

    // Submission state
    match form.submission() {
        SubmissionState::Idle => {}
        SubmissionState::Submitting => {
            body.push_str(
                "<p class=\"notice\">Submitting…</p>\
                 <form method=\"post\" action=\"/cancel\"><button type=\"submit\">Cancel</button></form>",
            );
        }
        SubmissionState::Completed { block_hash } => {
            let _ = write!(
                body,
                "<p class=\"success\">Completed at block hash #{}</p>",
                escape(block_hash)
            );
        }
        SubmissionState::Failed { kind, reason } => {
            let _ = write!(
                body,
                "<p class=\"error\">{}: {}</p>",
                failure_label(*kind),
                escape(reason)
            );
        }
    }

    if !form.status_log().is_empty() {
        body.push_str("<ol class=\"status\">");
        for line in form.status_log() {
            let _ = write!(
                body,
                "<li><time>{}</time> {}</li>",
                line.at.format("%H:%M:%S"),
                escape(&line.message)
            );
        }
        body.push_str("</ol>");
    }

    let _ = write!(
        body,
        "<footer>{} v{}",
        escape(&chain.spec_name),
        chain.spec_version
    );
    if let Some(para_id) = chain.parachain_id {
        let _ = write!(body, " · parachain {}", para_id);
    }
    if let Some(xcm) = chain.safe_xcm_version {
        let _ = write!(body, " · XCM v{}", xcm);
    }
    let _ = write!(body, " · asset {}</footer>", escape(form.asset_id()));

    body
}

fn failure_label(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Validation => "Invalid transfer",
        FailureKind::Signing => "Signing failed",
        FailureKind::Submission => "Transaction failed",
        FailureKind::Timeout => "Timed out",
        FailureKind::Cancelled => "Cancelled",
    }
}

fn layout(title: &str, refresh: bool, body: String) -> String {
    let refresh = if refresh {
        format!("<meta http-equiv=\"refresh\" content=\"{}\">", REFRESH_SECS)
    } else {
        String::new()
    };
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">{refresh}<title>{title}</title>\
         <style>body{{font-family:sans-serif;max-width:44rem;margin:2rem auto}}\
         label{{display:block;margin:.5rem 0}}.error{{color:#b00020}}.success{{color:#1b5e20}}\
         footer{{margin-top:2rem;color:#666;font-size:.85rem}}</style></head>\
         <body>{body}</body></html>",
        refresh = refresh,
        title = escape(title),
        body = body,
    )
}

/// Escape text for HTML element content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{AssetMetadata, TxStatus};
    use crate::wallet::Account;

    const ALICE: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

    fn ready(form: TransferForm) -> AppPhase {
        AppPhase::Ready {
            form,
            chain: ChainInfo {
                spec_name: "westmint".to_string(),
                spec_version: 9435,
                safe_xcm_version: Some(3),
                parachain_id: Some(1000),
            },
        }
    }

    fn form() -> TransferForm {
        let asset = AssetMetadata {
            name: "Joe".to_string(),
            symbol: "JOE".to_string(),
            decimals: 2,
        };
        TransferForm::new("8", asset, vec![Account::new(ALICE, "keystore", "Alice")]).unwrap()
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_loading_page_refreshes() {
        let html = render(&AppPhase::Loading);
        assert!(html.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn test_no_wallet_page() {
        let html = render(&AppPhase::NoWallet {
            reason: "No <wallet>".to_string(),
        });
        assert!(html.contains("No &lt;wallet&gt;"));
        assert!(!html.contains("http-equiv=\"refresh\""));
        assert!(!html.contains("action=\"/transfer\""));
    }

    #[test]
    fn test_ready_page_shows_form_and_balance() {
        let mut form = form();
        let ticket = form.refresh_balance();
        form.apply_balance(&ticket, Ok(50_025));

        let html = render(&ready(form));
        assert!(html.contains("<title>Transact JOE</title>"));
        assert!(html.contains("500.25 JOE"));
        assert!(html.contains("50025 base units"));
        assert!(html.contains("action=\"/transfer\""));
        assert!(html.contains(ALICE));
        assert!(html.contains("westmint v9435"));
        assert!(!html.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn test_completed_submission_shows_block_hash() {
        let mut form = form();
        form.set_recipient(ALICE);
        form.set_amount("100");
        let pending = form.begin_submission().unwrap();
        form.record_status(
            pending.id,
            &TxStatus::InBlock {
                block_hash: "0xabc".to_string(),
            },
        );

        let html = render(&ready(form));
        assert!(html.contains("Completed at block hash #0xabc"));
    }

    #[test]
    fn test_submitting_page_offers_cancel() {
        let mut form = form();
        form.set_recipient(ALICE);
        form.set_amount("1");
        form.begin_submission().unwrap();

        let html = render(&ready(form));
        assert!(html.contains("action=\"/cancel\""));
        assert!(html.contains("http-equiv=\"refresh\""));
    }
}

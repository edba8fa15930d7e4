/// Destination of the copy actions.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), anyhow::Error>;
}

/// Opens URLs outside the client, e.g. a share page in a new browser tab.
pub trait Navigator {
    fn open(&mut self, url: &str) -> Result<(), anyhow::Error>;
}

/// Terminal stand-in for the clipboard: the text is printed so it can be
/// selected and copied by hand.
pub struct TerminalClipboard;

impl Clipboard for TerminalClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), anyhow::Error> {
        log::debug!("Copying {} bytes to terminal clipboard", text.len());
        println!("{}", text);
        Ok(())
    }
}

pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn open(&mut self, url: &str) -> Result<(), anyhow::Error> {
        log::info!("Opening {}", url);
        println!("{}", url);
        Ok(())
    }
}

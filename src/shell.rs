use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::export::save_to_csv;
use crate::fetch::fetch_listings;
use crate::model::Crypto;
use crate::store::CryptoStore;

const PAGE_SIZE: usize = 15;
const EXPORT_DIR: &str = "snapshots";
const DEFAULT_FETCH_LIMIT: u32 = 100;

/// Menu-driven console session. Owns the store and the API key for the
/// lifetime of the process; both start empty and die with it.
///
/// Generic over the input source so a test can script a whole session
/// through a `Cursor`. Output goes straight to stdout.
pub struct Shell<R> {
    store: CryptoStore,
    api_key: Option<String>,
    input: R,
}

impl<R: BufRead> Shell<R> {
    pub fn new(input: R) -> Self {
        Self {
            store: CryptoStore::new(),
            api_key: None,
            input,
        }
    }

    pub fn store(&self) -> &CryptoStore {
        &self.store
    }

    /// Runs the menu loop until the user exits or stdin closes. Every
    /// operation failure is printed and the loop keeps going; only an I/O
    /// error on the console itself propagates.
    pub async fn run(&mut self) -> io::Result<()> {
        loop {
            print_menu();
            let Some(choice) = self.read_menu_choice()? else {
                break;
            };
            match choice {
                1 => self.set_api_key()?,
                2 => self.fetch().await?,
                3 => self.browse()?,
                4 => self.find_by_name()?,
                5 => self.top_by_market_cap()?,
                6 => self.price_range()?,
                7 => self.total_market_cap(),
                8 => self.manual_add()?,
                9 => self.export()?,
                10 => {
                    println!("Exiting.");
                    break;
                }
                _ => println!("Invalid choice. Try again."),
            }
        }
        Ok(())
    }

    /// Re-prompts until the line parses as an integer; there is no retry
    /// limit. `None` means stdin closed.
    fn read_menu_choice(&mut self) -> io::Result<Option<i64>> {
        loop {
            let Some(line) = self.prompt("Choose an option (1-10): ")? else {
                return Ok(None);
            };
            match line.parse::<i64>() {
                Ok(choice) => return Ok(Some(choice)),
                Err(_) => println!("Invalid choice. Try again."),
            }
        }
    }

    fn set_api_key(&mut self) -> io::Result<()> {
        let Some(key) = self.prompt("Enter your CoinMarketCap API key: ")? else {
            return Ok(());
        };
        self.api_key = Some(key);
        println!("API key set.");
        Ok(())
    }

    async fn fetch(&mut self) -> io::Result<()> {
        if self.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            println!("Set an API key first (option 1).");
            return Ok(());
        }
        let Some(line) =
            self.prompt("How many listings to fetch (default 100, each costs API credits): ")?
        else {
            return Ok(());
        };
        let limit = if line.is_empty() {
            DEFAULT_FETCH_LIMIT
        } else {
            match line.parse() {
                Ok(limit) => limit,
                Err(_) => {
                    println!("Error: enter a whole number.");
                    return Ok(());
                }
            }
        };
        match fetch_listings(self.api_key.as_deref(), limit).await {
            Ok(records) => {
                let added = records.len();
                self.store.extend(records);
                println!("Loaded {added} listings ({} total in store).", self.store.len());
            }
            Err(err) => println!("Fetch failed: {err:#}"),
        }
        Ok(())
    }

    /// Paginated browser: `e` next page, `q` previous page, `x` back to the
    /// menu. Boundary violations keep the current page.
    fn browse(&mut self) -> io::Result<()> {
        if self.store.is_empty() {
            println!("Load data first (option 2).");
            return Ok(());
        }
        let total = self.store.total_pages(PAGE_SIZE);
        let mut page = 1;
        loop {
            println!("\n=== Page {page}/{total} ===");
            for (i, record) in self.store.page(page, PAGE_SIZE).iter().enumerate() {
                println!(
                    "{}. {} ({}): ${:.2}",
                    i + 1,
                    record.name,
                    record.symbol,
                    record.price
                );
            }
            println!("\ne - next page, q - previous page, x - back to menu");
            let Some(command) = self.prompt("Action: ")? else {
                return Ok(());
            };
            match command.to_lowercase().as_str() {
                "e" => {
                    if page < total {
                        page += 1;
                    } else {
                        println!("Already on the last page.");
                    }
                }
                "q" => {
                    if page > 1 {
                        page -= 1;
                    } else {
                        println!("Already on the first page.");
                    }
                }
                "x" => return Ok(()),
                _ => println!("Invalid input."),
            }
        }
    }

    fn find_by_name(&mut self) -> io::Result<()> {
        let Some(name) = self.prompt("Cryptocurrency name: ")? else {
            return Ok(());
        };
        match self.store.find_by_name(&name) {
            Some(record) => println!("{record}"),
            None => println!("Cryptocurrency not found."),
        }
        Ok(())
    }

    fn top_by_market_cap(&mut self) -> io::Result<()> {
        let Some(line) = self.prompt("How many to show: ")? else {
            return Ok(());
        };
        let n: usize = match line.parse() {
            Ok(n) => n,
            Err(_) => {
                println!("Error: enter a whole number.");
                return Ok(());
            }
        };
        for (i, record) in self.store.top_by_market_cap(n).iter().enumerate() {
            println!(
                "{}. {} ({}) - Market Cap: ${:.2}",
                i + 1,
                record.name,
                record.symbol,
                record.market_cap
            );
        }
        Ok(())
    }

    fn price_range(&mut self) -> io::Result<()> {
        let Some(min) = self.prompt_f64("Minimum price: ")? else {
            return Ok(());
        };
        let Some(max) = self.prompt_f64("Maximum price: ")? else {
            return Ok(());
        };
        for record in self.store.in_price_range(min, max) {
            println!("{record}");
        }
        Ok(())
    }

    fn total_market_cap(&self) {
        println!("Total market cap: ${:.2}", self.store.total_market_cap());
    }

    /// Prompts for all five fields; any unparsable numeric field aborts the
    /// add and no record is created.
    fn manual_add(&mut self) -> io::Result<()> {
        let Some(name) = self.prompt("Name: ")? else {
            return Ok(());
        };
        let Some(symbol) = self.prompt("Symbol: ")? else {
            return Ok(());
        };
        let Some(price) = self.prompt_f64("Price (USD): ")? else {
            return Ok(());
        };
        let Some(market_cap) = self.prompt_f64("Market cap (USD): ")? else {
            return Ok(());
        };
        let Some(supply) = self.prompt_f64("Circulating supply: ")? else {
            return Ok(());
        };
        self.store
            .add(Crypto::new(name, symbol, price, market_cap, supply));
        println!("Cryptocurrency added.");
        Ok(())
    }

    fn export(&mut self) -> io::Result<()> {
        let Some(name) = self.prompt("File name to save (without the .csv extension): ")? else {
            return Ok(());
        };
        match save_to_csv(self.store.all(), Path::new(EXPORT_DIR).join(name)) {
            Ok(path) => println!("Data saved to {}", path.display()),
            Err(err) => println!("Failed to save file: {err:#}"),
        }
        Ok(())
    }

    /// Reads one trimmed line, `None` on end of input.
    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        print!("{message}");
        io::stdout().flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt_f64(&mut self, message: &str) -> io::Result<Option<f64>> {
        let Some(line) = self.prompt(message)? else {
            return Ok(None);
        };
        match line.parse::<f64>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                println!("Error: enter a valid number.");
                Ok(None)
            }
        }
    }
}

fn print_menu() {
    println!("\nMenu:");
    println!("1. Set CoinMarketCap API key");
    println!("2. Fetch data from the CoinMarketCap API");
    println!("3. Show all cryptocurrencies");
    println!("4. Find a cryptocurrency by name");
    println!("5. Show the top N by market cap");
    println!("6. Show cryptocurrencies in a price range");
    println!("7. Show the total market cap");
    println!("8. Add a cryptocurrency manually");
    println!("9. Save data to CSV");
    println!("10. Exit");
}

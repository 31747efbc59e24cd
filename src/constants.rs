/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_OLLAMA_HOST: &str = "localhost";
pub const DEFAULT_OLLAMA_PORT: u16 = 11434;
pub const DEFAULT_DASHBOARD_BIND: &str = "127.0.0.1:8501";

// Ollama API paths
pub const OLLAMA_TAGS_PATH: &str = "/api/tags";
pub const OLLAMA_CHAT_PATH: &str = "/api/chat";

// Output files
pub const DEFAULT_RESPONSES_DIR: &str = "responses";
pub const SECTION_SEPARATOR_CHAR: char = '=';
pub const DEFAULT_SEPARATOR_WIDTH: usize = 20;

// Prompts
pub const DEFAULT_SUPERSET_PROMPT: &str = "As a seasoned professional in analyzing chatbot responses, \
it's time to leverage your expertise. Analyze responses from various language models, \
amalgamate them if necessary, to deliver an optimal and refined solution.";

// Terminal text
pub const MENU_BANNER: &str = "******* Select language model to use *******";
pub const MENU_PROMPT: &str = "Enter the index of the language module you prefer: ";
pub const NAME_TAKEN_MESSAGE: &str = "File name already exists. Please provide a different file name!";

// REPL commands
pub const CMD_QUIT: &str = "/quit";
pub const CMD_LIST: &str = "/list";
pub const CMD_CLEAR: &str = "/clear";
pub const CMD_HELP: &str = "/help";

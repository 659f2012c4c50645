use std::fmt;

#[derive(Debug, Clone)]
pub enum IpGeoError {
    UnsupportedScheme(String),
    SourceFetch(String),
    FileOperation(String),
    Archive(String),
    MissingMember(String),
    MalformedRow(String),
    FieldParse(String),
    InvalidAddress(String),
    Config(String),
    Task(String),
}

impl IpGeoError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            IpGeoError::UnsupportedScheme(_) => "E001",
            IpGeoError::SourceFetch(_) => "E002",
            IpGeoError::FileOperation(_) => "E003",
            IpGeoError::Archive(_) => "E004",
            IpGeoError::MissingMember(_) => "E005",
            IpGeoError::MalformedRow(_) => "E006",
            IpGeoError::FieldParse(_) => "E007",
            IpGeoError::InvalidAddress(_) => "E008",
            IpGeoError::Config(_) => "E009",
            IpGeoError::Task(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            IpGeoError::UnsupportedScheme(_) => "Unsupported Source Scheme",
            IpGeoError::SourceFetch(_) => "Source Fetch Error",
            IpGeoError::FileOperation(_) => "File Operation Error",
            IpGeoError::Archive(_) => "Archive Error",
            IpGeoError::MissingMember(_) => "Archive Member Missing",
            IpGeoError::MalformedRow(_) => "Malformed Row",
            IpGeoError::FieldParse(_) => "Field Parse Error",
            IpGeoError::InvalidAddress(_) => "Invalid Address",
            IpGeoError::Config(_) => "Configuration Error",
            IpGeoError::Task(_) => "Background Task Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            IpGeoError::UnsupportedScheme(msg)
            | IpGeoError::SourceFetch(msg)
            | IpGeoError::FileOperation(msg)
            | IpGeoError::Archive(msg)
            | IpGeoError::MissingMember(msg)
            | IpGeoError::MalformedRow(msg)
            | IpGeoError::FieldParse(msg)
            | IpGeoError::InvalidAddress(msg)
            | IpGeoError::Config(msg)
            | IpGeoError::Task(msg) => msg,
        }
    }

    /// Source failures (network, file, scheme) as opposed to dataset format failures.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            IpGeoError::UnsupportedScheme(_)
                | IpGeoError::SourceFetch(_)
                | IpGeoError::FileOperation(_)
        )
    }

    /// Dataset format failures: broken archive, missing member, bad row or field.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            IpGeoError::Archive(_)
                | IpGeoError::MissingMember(_)
                | IpGeoError::MalformedRow(_)
                | IpGeoError::FieldParse(_)
        )
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for IpGeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for IpGeoError {}

// 便捷的构造函数
impl IpGeoError {
    pub fn unsupported_scheme<T: Into<String>>(msg: T) -> Self {
        IpGeoError::UnsupportedScheme(msg.into())
    }

    pub fn source_fetch<T: Into<String>>(msg: T) -> Self {
        IpGeoError::SourceFetch(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        IpGeoError::FileOperation(msg.into())
    }

    pub fn archive<T: Into<String>>(msg: T) -> Self {
        IpGeoError::Archive(msg.into())
    }

    pub fn missing_member<T: Into<String>>(msg: T) -> Self {
        IpGeoError::MissingMember(msg.into())
    }

    pub fn malformed_row<T: Into<String>>(msg: T) -> Self {
        IpGeoError::MalformedRow(msg.into())
    }

    pub fn field_parse<T: Into<String>>(msg: T) -> Self {
        IpGeoError::FieldParse(msg.into())
    }

    pub fn invalid_address<T: Into<String>>(msg: T) -> Self {
        IpGeoError::InvalidAddress(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        IpGeoError::Config(msg.into())
    }

    pub fn task<T: Into<String>>(msg: T) -> Self {
        IpGeoError::Task(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<std::io::Error> for IpGeoError {
    fn from(err: std::io::Error) -> Self {
        IpGeoError::FileOperation(err.to_string())
    }
}

impl From<zip::result::ZipError> for IpGeoError {
    fn from(err: zip::result::ZipError) -> Self {
        IpGeoError::Archive(err.to_string())
    }
}

impl From<csv::Error> for IpGeoError {
    fn from(err: csv::Error) -> Self {
        IpGeoError::MalformedRow(err.to_string())
    }
}

impl From<url::ParseError> for IpGeoError {
    fn from(err: url::ParseError) -> Self {
        IpGeoError::UnsupportedScheme(err.to_string())
    }
}

impl From<ureq::Error> for IpGeoError {
    fn from(err: ureq::Error) -> Self {
        IpGeoError::SourceFetch(err.to_string())
    }
}

impl From<tokio::task::JoinError> for IpGeoError {
    fn from(err: tokio::task::JoinError) -> Self {
        IpGeoError::Task(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IpGeoError>;

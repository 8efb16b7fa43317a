/// Default name of the records file inside the storage root.
pub const DATA_FILE_NAME: &str = "sistema_academico_dados.json";

/// Credential assigned to every account rebuilt from disk. Credentials are never persisted.
pub const PLACEHOLDER_CREDENTIAL: &str = "123";

pub const DEFAULT_ADMIN_LOGIN: &str = "admin";
pub const DEFAULT_ADMIN_NAME: &str = "Admin Master";
pub const DEFAULT_REGISTRAR_LOGIN: &str = "secretaria1";
pub const DEFAULT_REGISTRAR_NAME: &str = "Ana Secretária";

pub const PASSING_AVERAGE: f64 = 7.0;
pub const MINIMUM_ATTENDANCE: f64 = 75.0;

pub const MIN_GRADE: f64 = 0.0;
pub const MAX_GRADE: f64 = 10.0;

/// Personal-data key holding a student's address.
pub const ADDRESS_KEY: &str = "endereco";

/// `strftime` layout of attendance timestamps.
pub const ATTENDANCE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

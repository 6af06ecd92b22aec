//! NSI script templates.
//!
//! Values that contain backslashes (NSIS paths) are computed in Rust and
//! passed in whole, since a backslash before `{{` escapes the expression.

/// Wrapper installer: embeds both installers, runs the first and, only on
/// exit code 0, the second.
pub const WRAPPER_TEMPLATE: &str = r#"; {{product}} with Windows SDK
Unicode true

!include "FileFunc.nsh"
!include "LogicLib.nsh"

Name "{{product}} with Windows SDK"
OutFile "{{output}}"
InstallDir "{{install_dir}}"
RequestExecutionLevel {{execution_level}}
SetCompressor /SOLID {{compression}}
{{#if silent}}
SilentInstall silent
AutoCloseWindow true
ShowInstDetails hide
{{/if}}

Section
    SetOutPath "$INSTDIR"
    SetOverwrite on

    File "{{app_source}}"
    File "{{sdk_source}}"

    ExecWait '"{{app_installed}}"' $0
    ${If} $0 == 0
        ExecWait '"{{sdk_installed}}"{{sdk_args}}' $1
        ${If} $1 != 0
            SetErrorLevel $1
        ${EndIf}
    ${Else}
        SetErrorLevel $0
    ${EndIf}

    Delete "{{app_installed}}"
    Delete "{{sdk_installed}}"
    RMDir "$INSTDIR"
SectionEnd

Section "Uninstall"
    Delete "{{app_installed}}"
    Delete "{{sdk_installed}}"
    RMDir "$INSTDIR"
SectionEnd
{{#if unique_install_dir}}

Function .onInit
    ${GetTime} "" "L" $0 $1 $2 $3 $4 $5 $6
    StrCpy $INSTDIR "{{install_dir}}_$2$1$0$4$5$6"
    CreateDirectory $INSTDIR
FunctionEnd
{{/if}}
"#;

/// Direct installer built from the extracted application files.
pub const DIRECT_TEMPLATE: &str = r#"; {{product}} with Windows SDK
Unicode true

!include "MUI2.nsh"
!include "LogicLib.nsh"

Name "{{product}} with Windows SDK"
OutFile "{{output}}"
InstallDir "{{install_dir}}"
RequestExecutionLevel {{execution_level}}
SetCompressor /SOLID {{compression}}

!define MUI_ABORTWARNING

!insertmacro MUI_PAGE_WELCOME
!insertmacro MUI_PAGE_DIRECTORY
!insertmacro MUI_PAGE_INSTFILES
!insertmacro MUI_PAGE_FINISH

!insertmacro MUI_UNPAGE_CONFIRM
!insertmacro MUI_UNPAGE_INSTFILES

!insertmacro MUI_LANGUAGE "English"

Section "{{product}}" SecApp
    SetOutPath "$INSTDIR"
    SetOverwrite on

    File /r "{{app_files}}"
    File "{{sdk_source}}"

    CreateDirectory "{{start_menu_dir}}"
    CreateShortcut "{{start_menu_link}}" "{{app_executable}}"
    CreateShortcut "{{desktop_link}}" "{{app_executable}}"

    ExecWait '"{{sdk_installed}}"{{sdk_args}}' $1
    ${If} $1 != 0
        DetailPrint "Windows SDK installer returned $1"
    ${EndIf}

    WriteUninstaller "{{uninstaller}}"
SectionEnd

Section "Uninstall"
    Delete "{{start_menu_link}}"
    Delete "{{desktop_link}}"
    RMDir "{{start_menu_dir}}"

    Delete "{{sdk_installed}}"
    Delete "{{uninstaller}}"
    RMDir /r "$INSTDIR"
SectionEnd
"#;
